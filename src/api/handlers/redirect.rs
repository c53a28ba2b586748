//! Handler for short URL redirect.

use std::net::SocketAddr;

use axum::{
    Extension,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use crate::domain::click_event::ClickContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code or custom alias to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code against active records (no caching)
/// 2. Reject expired records with 410 Gone
/// 3. Hand a click event to the background worker (never awaited)
/// 4. Return 302 Found
///
/// # Click Tracking
///
/// If the click queue is full the event is dropped. The redirect is sent
/// either way.
///
/// # Errors
///
/// - 404 Not Found if the code does not resolve
/// - 410 Gone if the link has expired
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<Extension<ConnectInfo<SocketAddr>>>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = ClickContext {
        ip: Some(client_ip(
            &headers,
            peer.map(|Extension(ConnectInfo(addr))| addr),
            state.settings.behind_proxy,
        )),
        user_agent: header_str(&headers, header::USER_AGENT),
        referrer: header_str(&headers, header::REFERER),
    };

    let record = state.redirect_service.redirect(&code, ctx).await?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, record.original_url)],
    ))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
