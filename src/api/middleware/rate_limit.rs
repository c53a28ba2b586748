//! Per-client rate limiting backed by the in-memory sliding-window limiter.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

static LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Rejects requests over quota with `429 Too Many Requests`.
///
/// The key is the client IP: the peer address, or the forwarded address when
/// `BEHIND_PROXY` is set. Rejected requests are not counted against the
/// window.
///
/// # Response Headers
///
/// - `X-RateLimit-Limit` / `X-RateLimit-Remaining` on every response
/// - `Retry-After` (window length in seconds) on 429
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_ip(req.headers(), peer, st.settings.behind_proxy);
    let limiter = &st.rate_limiter;

    if !limiter.allow(&key) {
        metrics::counter!("rate_limit_rejections_total").increment(1);
        warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");

        let mut response = AppError::rate_limited().into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(limiter.window().as_secs()));
        headers.insert(LIMIT_HEADER.clone(), HeaderValue::from(limiter.limit()));
        headers.insert(REMAINING_HEADER.clone(), HeaderValue::from(0usize));
        return response;
    }

    let remaining = limiter.remaining(&key);
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER.clone(), HeaderValue::from(limiter.limit()));
    headers.insert(REMAINING_HEADER.clone(), HeaderValue::from(remaining));
    response
}
