//! Client IP extraction for rate limiting and click analytics.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Key used when neither the peer address nor proxy headers are available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Determines the client IP of a request.
///
/// With `behind_proxy` set, the first valid address in `X-Forwarded-For` wins,
/// then `X-Real-IP`. Otherwise (or if those are missing or malformed) the socket
/// peer address is used. Header values are only trusted behind a reverse proxy,
/// since clients can forge them.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    from_forwarded_for.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    })
}
