//! Password hashing helpers around bcrypt.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::common::ApiError;

/// Hash a plaintext password with bcrypt's default cost.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| ApiError::InternalServer(format!("Password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash.
///
/// Google-linked accounts store no hash; a missing or empty hash never
/// verifies, so a password login against such an account simply fails.
pub fn verify_password(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) if !hash.is_empty() => verify(password, hash).unwrap_or(false),
        _ => false,
    }
}
