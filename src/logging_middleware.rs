// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response,
};
use tracing::debug;

/// Requests above this size (file uploads) are passed through unlogged.
const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    // Never buffer multipart uploads just to log them
    let is_multipart = request
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/"))
        .unwrap_or(false);
    if is_multipart {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() && bytes.len() <= MAX_LOGGED_BODY_BYTES {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body_str,
                "Request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() && bytes.len() <= MAX_LOGGED_BODY_BYTES {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                status = %parts.status,
                response_body = %body_str,
                "Response"
            );
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
