//! Login rate limiting
//!
//! Fixed-window limiter keyed by client IP. Only the login route is
//! throttled, so there is no per-route dimension; the whole thing is a
//! map of IP -> attempt window, swept periodically from main.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Login attempts allowed per IP within one window
const MAX_ATTEMPTS: u32 = 5;
const WINDOW: Duration = Duration::from_secs(60);
/// Windows idle longer than this are dropped by `cleanup`
const STALE_AFTER: Duration = Duration::from_secs(300);

struct AttemptWindow {
    count: u32,
    started: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<Mutex<HashMap<String, AttemptWindow>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one login attempt for `ip`; `false` means over the limit.
    async fn allow(&self, ip: &str) -> bool {
        let mut attempts = self.attempts.lock().await;
        let now = Instant::now();

        let window = attempts.entry(ip.to_owned()).or_insert(AttemptWindow {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) >= WINDOW {
            window.count = 0;
            window.started = now;
        }

        window.count += 1;
        window.count <= MAX_ATTEMPTS
    }

    /// Drop windows that have been idle past `STALE_AFTER`
    pub async fn cleanup(&self) {
        let now = Instant::now();
        self.attempts
            .lock()
            .await
            .retain(|_, window| now.duration_since(window.started) < STALE_AFTER);
    }
}

/// Client IP for rate-limiting purposes: X-Forwarded-For when a reverse
/// proxy is in front (first entry is the original client), otherwise the
/// peer address.
fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Rate limit middleware for the login route
pub async fn login_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = client_ip(&request);
    if !state.rate_limiter.allow(&ip).await {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            axum::Json(serde_json::json!({"error": "Too many requests, try again later"})),
        )
            .into_response());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_applies_per_ip() {
        let limiter = RateLimiter::new();

        for _ in 0..MAX_ATTEMPTS {
            assert!(limiter.allow("10.0.0.1").await);
        }
        assert!(!limiter.allow("10.0.0.1").await);

        // A different IP has its own window
        assert!(limiter.allow("10.0.0.2").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::new();

        for _ in 0..=MAX_ATTEMPTS {
            limiter.allow("10.0.0.1").await;
        }
        assert!(!limiter.allow("10.0.0.1").await);

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;
        assert!(limiter.allow("10.0.0.1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_stale_windows() {
        let limiter = RateLimiter::new();
        assert!(limiter.allow("10.0.0.1").await);

        tokio::time::advance(STALE_AFTER + Duration::from_secs(1)).await;
        limiter.cleanup().await;

        assert!(limiter.attempts.lock().await.is_empty());
    }
}
