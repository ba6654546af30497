// src/services/mod.rs

pub mod google;
pub mod rate_limit;

pub use google::GoogleService;
pub use rate_limit::{RateLimitResult, RateLimitService};
