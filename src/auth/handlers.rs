//! Authentication handlers

use axum::extract::{Extension, Json, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::AuthedUser;
use super::models::{Claims, GoogleIdTokenPayload, LoginRequest, SignupRequest, User};
use super::password::{hash_password, verify_password};
use super::validators::SignupValidator;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState, Validator};
use crate::services::google::GoogleClaims;

/// Session lifetime for issued JWTs.
const TOKEN_LIFETIME_HOURS: i64 = 2;

/// POST /api/auth/signup
/// Creates an email/password account
///
/// # Request Body
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "...",
///   "confirm_password": "..."
/// }
/// ```
pub async fn signup_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = SignupValidator.validate(&payload);
    if !validation.is_valid() {
        return Err(validation.into());
    }

    let email = payload.email.trim().to_lowercase();
    let password_hash = hash_password(&payload.password)?;
    let user_id = generate_user_id();
    let now = Utc::now().to_rfc3339();

    let insert = sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, is_google_user, created_at)
        VALUES (?, ?, ?, 0, ?)
        "#,
    )
    .bind(&user_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(&now)
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            warn!(
                email = %safe_email_log(&email),
                "Signup rejected: email already registered"
            );
            return Err(ApiError::Conflict("Email already exists.".to_string()));
        }
        error!(error = %e, "Database error inserting new user during signup");
        return Err(ApiError::DatabaseError(e));
    }

    info!(
        user_id = %user_id,
        email = %safe_email_log(&email),
        "Account created successfully"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created successfully!",
            "user": { "id": user_id, "email": email },
        })),
    ))
}

/// POST /api/auth/login
/// Authenticates an email/password account and issues a JWT
pub async fn login_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let email = payload.email.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(
                email = %safe_email_log(&email),
                "Login failed: unknown email"
            );
            return Err(ApiError::Unauthorized("Invalid credentials.".to_string()));
        }
    };

    if user.is_google_user != 0 {
        warn!(
            user_id = %user.id,
            "Login rejected: account is linked with Google"
        );
        return Err(ApiError::BadRequest(
            "This account is linked with Google. Use Google login instead.".to_string(),
        ));
    }

    if !verify_password(&payload.password, user.password_hash.as_deref()) {
        warn!(user_id = %user.id, "Login failed: password verification failed");
        return Err(ApiError::Unauthorized("Invalid credentials.".to_string()));
    }

    let token = issue_token(&user.id, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful"
    );

    Ok(Json(json!({
        "token": token,
        "user": user,
    })))
}

/// POST /api/auth/google
/// Authenticates a user via a client-obtained Google OAuth ID token
///
/// # Request Body
/// ```json
/// {
///   "id_token": "<google id token>"
/// }
/// ```
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Received Google auth request");
    let state = state_lock.read().await.clone();

    let claims = state.google_service.verify_id_token(&payload.id_token).await?;
    finish_google_login(&state, claims).await
}

/// GET /auth/google - Start Google OAuth flow
/// Redirects user to Google's authorization page
pub async fn google_oauth_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<axum::response::Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let redirect_uri = oauth_redirect_uri();
    info!(redirect_uri = %redirect_uri, "Starting Google OAuth flow");

    let auth_url = state.google_service.authorization_url(&redirect_uri)?;
    Ok(axum::response::Redirect::to(&auth_url))
}

/// GET /auth/google/callback - Handle OAuth callback from Google
/// Exchanges the authorization code, verifies the ID token, and signs the
/// user in (creating the account on first Google login).
pub async fn google_oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(error) = params.get("error") {
        error!(oauth_error = %error, "Google OAuth returned error");
        return Err(ApiError::BadRequest(format!(
            "Google login failed: {}",
            error
        )));
    }

    let code = params.get("code").ok_or_else(|| {
        error!("No authorization code in OAuth callback");
        ApiError::BadRequest("No authorization code provided".to_string())
    })?;

    info!("Received OAuth callback with authorization code");

    let redirect_uri = oauth_redirect_uri();
    let tokens = state
        .google_service
        .exchange_code(code, &redirect_uri)
        .await?;

    let id_token = tokens.id_token.ok_or_else(|| {
        error!("Google token response carried no id_token");
        ApiError::InternalServer("Google login failed: no identity token".to_string())
    })?;

    let claims = state.google_service.verify_id_token(&id_token).await?;
    finish_google_login(&state, claims).await
}

/// GET /api/me
/// Returns the current authenticated user's information
#[axum::debug_handler]
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(json!({ "user": user })))
}

/// POST /api/auth/logout
/// Logout endpoint - since we're using JWT tokens, logout is handled
/// client-side. This endpoint just confirms the logout request.
pub async fn logout_handler(_authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    info!("User logout successful");
    Ok(Json(json!({ "message": "Logout successful" })))
}

// ---- Helper Functions ----

/// Create a signed session token for the given user id.
pub fn issue_token(user_id: &str, secret: &str) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error during authentication");
        ApiError::InternalServer("jwt error".to_string())
    })
}

fn oauth_redirect_uri() -> String {
    std::env::var("GOOGLE_OAUTH_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:8080/auth/google/callback".to_string())
}

/// Look up or create the Google-linked user and issue a session token.
async fn finish_google_login(
    state: &AppState,
    claims: GoogleClaims,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = claims.email.to_lowercase();
    debug!(
        email = %safe_email_log(&email),
        provider = "google",
        provider_id = %claims.sub,
        "Google token validation successful, proceeding with user lookup"
    );

    let user = find_or_create_google_user(&state.db, &email).await?;
    let token = issue_token(&user.id, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    Ok(Json(json!({
        "token": token,
        "user": user,
    })))
}

async fn find_or_create_google_user(db: &SqlitePool, email: &str) -> Result<User, ApiError> {
    let existing: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                email = %safe_email_log(email),
                "Database error checking existing user during OAuth flow"
            );
            ApiError::DatabaseError(e)
        })?;

    if let Some(user) = existing {
        return Ok(user);
    }

    let id = generate_user_id();
    info!(
        user_id = %id,
        email = %safe_email_log(email),
        provider = "google",
        "Creating new user account via Google OAuth"
    );

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (id, email, password_hash, is_google_user, created_at)
        VALUES (?, ?, NULL, 1, ?)
        "#,
    )
    .bind(&id)
    .bind(email)
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            email = %safe_email_log(email),
            "Database error inserting new user during OAuth flow"
        );
        ApiError::DatabaseError(e)
    })?;

    // Fetch by email rather than id: a concurrent login may have won the
    // INSERT OR IGNORE race.
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                email = %safe_email_log(email),
                "Database error fetching newly created user during OAuth flow"
            );
            ApiError::DatabaseError(e)
        })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
