//! API route configuration.
//!
//! Identity is resolved for every route by [`crate::api::middleware::auth`];
//! handlers that need a caller take the `CurrentUser` extractor.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::handlers::{
    create_url_handler, delete_url_handler, list_urls_handler, login_handler, logout_handler,
    oauth_callback_handler, oauth_login_handler, profile_handler, refresh_handler,
    register_handler, session_login_handler, session_logout_handler, session_profile_handler,
    update_url_handler, url_analytics_handler, url_info_handler,
};
use crate::state::AppState;

/// Routes mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `POST   /auth/register`          - Create a password account
/// - `POST   /auth/login`             - Password login, issues a JWT
/// - `POST   /auth/logout`            - Clear the token cookie
/// - `GET    /auth/profile`           - Current user
/// - `POST   /auth/refresh`           - Re-issue a JWT
/// - `GET    /session/oauth/login`    - Start OAuth login
/// - `GET    /session/oauth/callback` - Finish OAuth login
/// - `POST   /session/login`          - Password login into a session
/// - `POST   /session/logout`         - Destroy the session
/// - `GET    /session/profile`        - Session user
/// - `POST   /urls`                   - Create a short URL
/// - `GET    /urls`                   - List own URLs
/// - `PUT    /urls/{id}`              - Update own URL
/// - `DELETE /urls/{id}`              - Soft-delete own URL
/// - `GET    /urls/{id}/analytics`    - Click analytics
/// - `GET    /urls/{code}/info`       - Public link metadata
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/session", session_routes())
        .merge(url_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/profile", get(profile_handler))
        .route("/refresh", post(refresh_handler))
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/oauth/login", get(oauth_login_handler))
        .route("/oauth/callback", get(oauth_callback_handler))
        .route("/login", post(session_login_handler))
        .route("/logout", post(session_logout_handler))
        .route("/profile", get(session_profile_handler))
}

// The router requires one parameter name per path segment, so `{id}` also
// carries the short code on the info route.
fn url_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", post(create_url_handler).get(list_urls_handler))
        .route(
            "/urls/{id}",
            put(update_url_handler).delete(delete_url_handler),
        )
        .route("/urls/{id}/analytics", get(url_analytics_handler))
        .route("/urls/{id}/info", get(url_info_handler))
}
