//! CORS policy for the browser frontend.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Allows the configured frontend origin, with credentials so the `token` and
/// `session_id` cookies are sent.
///
/// An origin that is not a valid header value yields a layer that allows no
/// cross-origin requests.
pub fn layer(frontend_url: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            warn!(error = %e, "Invalid FRONTEND_URL, CORS disabled");
            base
        }
    }
}
