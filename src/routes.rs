//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (public)
//! - `GET  /health`      - Health check: DB, click queue (public, not rate limited)
//! - `/api/v1/*`         - REST API (auth per route)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Frontend origin with credentials
//! - **Rate limiting** - Per-IP sliding window (configurable for proxy deployments)
//! - **Identity** - Bearer token, `token` cookie or `session_id` cookie
//! - **Path normalization** - Trailing slash handling

use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, cors, rate_limit, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `frontend_url` - origin allowed by CORS
pub fn app_router(state: AppState, frontend_url: &str) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, frontend_url))
}

/// The router without path normalization.
pub fn build_router(state: AppState, frontend_url: &str) -> Router {
    let api_router = api::routes::api_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::layer,
    ));

    let limited = Router::new()
        .route("/{code}", get(redirect_handler))
        .nest("/api/v1", api_router)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(limited)
        .with_state(state)
        .layer(cors::layer(frontend_url))
        .layer(tracing::layer())
}
