use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

use crate::api::ApiError;

/// Request ID stored as a request extension and echoed as `x-request-id`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct Window {
    started_at: Instant,
    used: usize,
}

/// Fixed-window limiter shared by every request to the search route.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(Window {
                started_at: Instant::now(),
                used: 0,
            })),
        }
    }

    /// Takes one slot from the current window, or returns how long until the
    /// window resets.
    async fn try_acquire(&self) -> Result<(), Duration> {
        let mut current = self.current.lock().await;
        let elapsed = current.started_at.elapsed();
        if elapsed >= self.window {
            current.started_at = Instant::now();
            current.used = 0;
        } else if current.used >= self.max_requests {
            return Err(self.window.saturating_sub(elapsed));
        }
        current.used += 1;
        Ok(())
    }
}

/// Uses the caller's `x-request-id` when present and non-blank, otherwise a
/// fresh `UUIDv4`.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}

/// Rejects requests past the window's budget with a `rate_limited` envelope
/// and a `Retry-After` header.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    match rate_limit.try_acquire().await {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.clone())
                .unwrap_or_default();
            let secs = retry_after.as_secs().max(1);
            tracing::warn!(
                max = rate_limit.max_requests,
                retry_after_secs = secs,
                "search rate limit exceeded"
            );
            let mut res =
                ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response();
            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
            res
        }
    }
}
