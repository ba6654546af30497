// src/services/google.rs
//! Google OAuth client: authorization URL construction, code exchange, and
//! ID-token verification via Google's tokeninfo endpoint.
//! Docs: https://developers.google.com/identity/sign-in/web/backend-auth

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
}

/// Token endpoint response for an authorization-code exchange.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

/// The identity fields this application uses from a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleClaims {
    pub email: String,
    pub sub: String,
}

#[derive(Debug, Clone)]
pub struct GoogleService {
    client_id: Option<String>,
    client_secret: Option<String>,
    client: Client,
}

impl GoogleService {
    pub fn new(client_id: Option<String>, client_secret: Option<String>, client: Client) -> Self {
        Self {
            client_id,
            client_secret,
            client,
        }
    }

    /// Build the service from GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET,
    /// reusing the application's HTTP client.
    pub fn from_env(client: Client) -> Self {
        Self::new(
            std::env::var("GOOGLE_CLIENT_ID").ok(),
            std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            client,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    fn credentials(&self) -> Result<(&str, &str), GoogleError> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(GoogleError::NotConfigured),
        }
    }

    /// Authorization URL for the OAuth redirect flow. Scopes cover identity
    /// only: openid, email, profile.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<String, GoogleError> {
        let (client_id, _) = self.credentials()?;
        let scope_param = "openid email profile";

        let auth_url = format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(scope_param)
        );

        debug!("Generated Google OAuth authorization URL");
        Ok(auth_url)
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = %status, "Google token endpoint rejected code exchange");
            return Err(GoogleError::OAuthFailed(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| GoogleError::OAuthFailed(format!("malformed token response: {}", e)))
    }

    /// Verify an ID token against Google's tokeninfo endpoint.
    ///
    /// Checks required fields (email, sub), expiry, and - when a client id is
    /// configured - the audience.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleClaims, GoogleError> {
        let tokeninfo_url = format!(
            "https://oauth2.googleapis.com/tokeninfo?id_token={}",
            urlencoding::encode(id_token)
        );

        debug!("Initiating Google token validation with tokeninfo endpoint");

        let response = self
            .client
            .get(&tokeninfo_url)
            .send()
            .await
            .map_err(|e| GoogleError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(http_status = %status, "Google tokeninfo rejected ID token");
            return Err(match status.as_u16() {
                400 => GoogleError::InvalidToken("invalid or malformed id_token".to_string()),
                401 => GoogleError::InvalidToken("expired or invalid id_token".to_string()),
                _ => GoogleError::InvalidToken("id_token validation failed".to_string()),
            });
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|_| GoogleError::InvalidToken("malformed id_token".to_string()))?;

        let email = body
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let sub = body.get("sub").and_then(|v| v.as_str()).map(str::to_string);

        let (Some(email), Some(sub)) = (email, sub) else {
            warn!("Google token missing required fields (email/sub)");
            return Err(GoogleError::InvalidToken(
                "No email found in Google token.".to_string(),
            ));
        };

        if let Some(email_verified) = body.get("email_verified").and_then(|v| v.as_str()) {
            if email_verified != "true" {
                warn!("Google token contains unverified email address");
            }
        }

        // tokeninfo reports exp as a string of epoch seconds
        if let Some(exp) = body
            .get("exp")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<i64>().ok())
        {
            if exp < Utc::now().timestamp() {
                warn!(token_exp = exp, "Google token has expired");
                return Err(GoogleError::InvalidToken("token has expired".to_string()));
            }
        }

        if let Some(client_id) = &self.client_id {
            match body.get("aud").and_then(|v| v.as_str()) {
                Some(aud) if aud == client_id => {
                    debug!("Google token audience validation successful");
                }
                Some(aud) => {
                    warn!(
                        token_audience = %aud,
                        "Google token audience validation failed - rejecting token"
                    );
                    return Err(GoogleError::InvalidToken(
                        "token audience mismatch".to_string(),
                    ));
                }
                None => {
                    warn!("Google token missing audience field - rejecting token");
                    return Err(GoogleError::InvalidToken(
                        "token missing audience".to_string(),
                    ));
                }
            }
        }

        Ok(GoogleClaims { email, sub })
    }
}
