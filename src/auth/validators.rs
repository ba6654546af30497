// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::SignupRequest;
use crate::common::{ValidationResult, Validator};

/// Symbols that satisfy the password strength rule.
const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// A strong password has at least 8 characters and contains an uppercase
/// letter, a lowercase letter, a digit, and a symbol.
pub fn is_strong_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

// ============================================================================
// Signup Validator
// ============================================================================

pub struct SignupValidator;

impl Validator<SignupRequest> for SignupValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.password != data.confirm_password {
            result.add_error("confirm_password", "Passwords do not match.");
        }

        if !is_strong_password(&data.password) {
            result.add_error(
                "password",
                "Password must be strong (8+ chars, upper, lower, number, symbol).",
            );
        }

        if !is_valid_email(data.email.trim()) {
            result.add_error("email", "Invalid email.");
        }

        result
    }
}
