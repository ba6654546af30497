//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Email/password signup and login
//! - Google OAuth authentication
//! - JWT token generation and validation
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod validators;


pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
