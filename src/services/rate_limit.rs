// src/services/rate_limit.rs
//! Fixed-window in-memory rate limiter.
//!
//! Counts requests per identifier (user token or client IP) within a rolling
//! window. Limits and the window length come from environment variables;
//! authenticated clients get a higher budget than anonymous ones.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

const DEFAULT_WINDOW_SECS: u64 = 60;
const DEFAULT_ANON_LIMIT: u32 = 30;
const DEFAULT_AUTH_LIMIT: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited { retry_after: u32 },
}

#[derive(Debug)]
struct WindowState {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimitService {
    enabled: bool,
    window: Duration,
    anon_limit: u32,
    auth_limit: u32,
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

impl RateLimitService {
    pub fn new(enabled: bool, window: Duration, anon_limit: u32, auth_limit: u32) -> Self {
        Self {
            enabled,
            window,
            anon_limit,
            auth_limit,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build the limiter from RATE_LIMIT_* environment variables.
    pub fn from_env() -> Self {
        let enabled = env::var("RATE_LIMIT_ENABLED")
            .map(|v| v != "false")
            .unwrap_or(true);
        let window_secs = parse_env("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS);
        let anon_limit = parse_env("RATE_LIMIT_ANON", DEFAULT_ANON_LIMIT);
        let auth_limit = parse_env("RATE_LIMIT_AUTH", DEFAULT_AUTH_LIMIT);

        Self::new(
            enabled,
            Duration::from_secs(window_secs),
            anon_limit,
            auth_limit,
        )
    }

    /// Count a request against the identifier's current window.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        is_authenticated: bool,
    ) -> RateLimitResult {
        if !self.enabled {
            return RateLimitResult::Allowed;
        }

        let limit = if is_authenticated {
            self.auth_limit
        } else {
            self.anon_limit
        };

        let now = Instant::now();
        let mut windows = self.windows.write().await;

        // Opportunistically drop stale windows so the map stays bounded by
        // the set of recently active clients.
        if windows.len() > 1024 {
            windows.retain(|_, w| now.duration_since(w.started) < self.window);
        }

        let window = windows.entry(identifier.to_string()).or_insert(WindowState {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        if window.count > limit {
            let elapsed = now.duration_since(window.started);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1) as u32;
            debug!(
                identifier = %identifier,
                count = window.count,
                limit = limit,
                "Rate limit window exhausted"
            );
            RateLimitResult::Limited { retry_after }
        } else {
            RateLimitResult::Allowed
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
