//! Fixed-window request limits for the login and registration routes

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shared::error::{AppError, ErrorCode};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

/// How many requests one client may send to a route per window
#[derive(Debug, Clone, Copy)]
pub struct Quota {
    pub route: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

pub const LOGIN: Quota = Quota {
    route: "login",
    max_requests: 5,
    window: Duration::from_secs(60),
};

pub const REGISTER: Quota = Quota {
    route: "register",
    max_requests: 3,
    window: Duration::from_secs(60),
};

/// Default idle age for [`RateLimiter::cleanup`]
pub const IDLE_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    hits: u32,
}

/// Per `(route, client)` counters
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(&'static str, String), Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request; `false` once the client exceeded the quota
    pub async fn allow(&self, quota: Quota, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((quota.route, client.to_owned()))
            .or_insert(Window { opened: now, hits: 0 });
        if now.duration_since(window.opened) >= quota.window {
            *window = Window { opened: now, hits: 0 };
        }
        window.hits += 1;
        window.hits <= quota.max_requests
    }

    /// Drop windows opened more than `idle_after` ago
    pub async fn cleanup(&self, idle_after: Duration) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, w| now.duration_since(w.opened) < idle_after);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer
fn client_of(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_owned();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |ConnectInfo(addr)| addr.ip().to_string())
}

async fn enforce(state: &AppState, quota: Quota, request: Request, next: Next) -> Response {
    let client = client_of(&request);
    if !state.rate_limiter.allow(quota, &client).await {
        tracing::warn!(route = quota.route, client = %client, "Rate limit exceeded");
        return AppError::new(ErrorCode::TooManyRequests)
            .with_detail("retryAfterSecs", quota.window.as_secs())
            .into_response();
    }
    next.run(request).await
}

pub async fn login_rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state, LOGIN, request, next).await
}

pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, REGISTER, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn quota_is_per_client_and_route() {
        let limiter = RateLimiter::new();
        for _ in 0..LOGIN.max_requests {
            assert!(limiter.allow(LOGIN, "10.0.0.1").await);
        }
        assert!(!limiter.allow(LOGIN, "10.0.0.1").await);
        assert!(limiter.allow(LOGIN, "10.0.0.2").await);
        assert!(limiter.allow(REGISTER, "10.0.0.1").await);
    }

    #[tokio::test]
    async fn window_reopens_after_it_elapses() {
        let quota = Quota {
            route: "short",
            max_requests: 1,
            window: Duration::from_millis(20),
        };
        let limiter = RateLimiter::new();
        assert!(limiter.allow(quota, "10.0.0.1").await);
        assert!(!limiter.allow(quota, "10.0.0.1").await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.allow(quota, "10.0.0.1").await);
    }

    #[tokio::test]
    async fn cleanup_drops_idle_windows_only() {
        let limiter = RateLimiter::new();
        limiter.allow(LOGIN, "10.0.0.1").await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        limiter.allow(LOGIN, "10.0.0.2").await;
        limiter.cleanup(Duration::from_millis(20)).await;
        assert_eq!(limiter.tracked().await, 1);
    }

    #[test]
    fn forwarded_header_wins_over_peer() {
        let request = axum::http::Request::builder()
            .header("x-forwarded-for", " 203.0.113.7 , 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_of(&request), "203.0.113.7");

        let bare = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_of(&bare), "unknown");
    }
}
