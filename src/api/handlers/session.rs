//! Handlers for cookie sessions: OAuth login and password login into the
//! in-memory session store.

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::auth::{
    LoginRequest, MessageResponse, OAuthCallbackParams, SessionResponse, UserResponse,
};
use crate::application::services::SessionGrant;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::{
    OAUTH_STATE_COOKIE, SESSION_COOKIE, SameSite, build_cookie, clear_cookie, read_cookie,
};

const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Starts an OAuth login.
///
/// # Endpoint
///
/// `GET /api/v1/session/oauth/login`
///
/// Stores a signed state in the `oauth_state` cookie (10 minutes) and answers
/// 302 Found to the provider's authorization URL.
///
/// # Errors
///
/// Returns 404 if no OAuth provider is configured.
pub async fn oauth_login_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let start = state.session_service.begin_oauth()?;

    let location = HeaderValue::from_str(&start.authorization_url).map_err(|e| {
        AppError::internal(
            "Invalid authorization URL",
            json!({ "error": e.to_string() }),
        )
    })?;
    let cookie = build_cookie(
        OAUTH_STATE_COOKIE,
        &start.state,
        OAUTH_STATE_TTL,
        state.settings.secure_cookies,
        SameSite::Lax,
    );

    Ok((
        StatusCode::FOUND,
        AppendHeaders([(header::SET_COOKIE, cookie), (header::LOCATION, location)]),
    )
        .into_response())
}

/// Completes an OAuth login.
///
/// # Endpoint
///
/// `GET /api/v1/session/oauth/callback?state=..&code=..`
///
/// The `state` parameter must equal the `oauth_state` cookie and carry a valid
/// signature. On success a session is created, its id is set as the
/// `session_id` cookie and the state cookie is cleared.
///
/// # Errors
///
/// - 401 `unauthorized` for a missing or mismatched state
/// - whatever the provider's code exchange reports
pub async fn oauth_callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Response, AppError> {
    let state_cookie = read_cookie(&headers, OAUTH_STATE_COOKIE);

    let grant = state
        .session_service
        .complete_oauth(state_cookie.as_deref(), &params.state, &params.code)
        .await?;

    let clear_state = clear_cookie(
        OAUTH_STATE_COOKIE,
        state.settings.secure_cookies,
        SameSite::Lax,
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_state)]),
        session_response(&state, grant),
    )
        .into_response())
}

/// Password login that opens a cookie session.
///
/// `POST /api/v1/session/login`
pub async fn session_login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let grant = state
        .session_service
        .password_login(&payload.email, &payload.password)
        .await?;

    Ok(session_response(&state, grant).into_response())
}

/// Destroys the current session and clears its cookie. Always succeeds.
///
/// `POST /api/v1/session/logout`
pub async fn session_logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session_id = read_cookie(&headers, SESSION_COOKIE);
    state.session_service.logout(session_id.as_deref());

    let cookie = clear_cookie(SESSION_COOKIE, state.settings.secure_cookies, SameSite::Lax);

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
        .into_response()
}

/// Current session's user.
///
/// `GET /api/v1/session/profile`
///
/// Answers 401 `session_invalid_or_expired` without a live session.
pub async fn session_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AppError> {
    let session_id = read_cookie(&headers, SESSION_COOKIE);
    let user = state.session_service.profile(session_id.as_deref()).await?;
    Ok(Json(user.into()))
}

fn session_response(state: &AppState, grant: SessionGrant) -> impl IntoResponse {
    let cookie = build_cookie(
        SESSION_COOKIE,
        &grant.session_id,
        state.sessions.ttl(),
        state.settings.secure_cookies,
        SameSite::Lax,
    );

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            user: grant.user.into(),
            expires_at: grant.expires_at,
        }),
    )
}
