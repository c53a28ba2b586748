//! Handlers for password accounts and JWT login.
//!
//! Successful logins return the token in the body and also set it as an
//! HttpOnly `token` cookie (`SameSite=Strict`, 24h) for browser clients.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::AppendHeaders,
};
use validator::Validate;

use crate::api::dto::auth::{
    LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UserResponse,
};
use crate::api::middleware::auth::TokenUser;
use crate::application::services::AuthOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::{SameSite, TOKEN_COOKIE, build_cookie, clear_cookie};

type WithCookie<T> = (AppendHeaders<[(header::HeaderName, HeaderValue); 1]>, Json<T>);

/// Registers a password account and logs it in.
///
/// # Endpoint
///
/// `POST /api/v1/auth/register`
///
/// # Errors
///
/// - 400 if the email, password or name fail validation
/// - 409 `conflict` if the email is already registered
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, WithCookie<TokenResponse>), AppError> {
    payload.validate()?;

    let outcome = state
        .auth_service
        .register(&payload.email, &payload.password, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, token_response(&state, outcome)))
}

/// Verifies a password and issues a JWT.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// Unknown emails and wrong passwords both answer 401 with the same message.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<WithCookie<TokenResponse>, AppError> {
    payload.validate()?;

    let outcome = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(token_response(&state, outcome))
}

/// Clears the `token` cookie. Bearer tokens stay valid until they expire.
///
/// `POST /api/v1/auth/logout`
pub async fn logout_handler(State(state): State<AppState>) -> WithCookie<MessageResponse> {
    let cookie = clear_cookie(TOKEN_COOKIE, state.settings.secure_cookies, SameSite::Strict);

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
}

/// `GET /api/v1/auth/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    TokenUser(identity): TokenUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.auth_service.get_user(identity.user_id).await?;
    Ok(Json(user.into()))
}

/// Re-issues a JWT with a fresh 24h lifetime.
///
/// `POST /api/v1/auth/refresh`
pub async fn refresh_handler(
    State(state): State<AppState>,
    TokenUser(identity): TokenUser,
) -> Result<WithCookie<TokenResponse>, AppError> {
    let outcome = state.auth_service.refresh(identity.user_id).await?;
    Ok(token_response(&state, outcome))
}

fn token_response(state: &AppState, outcome: AuthOutcome) -> WithCookie<TokenResponse> {
    let cookie = build_cookie(
        TOKEN_COOKIE,
        &outcome.token,
        state.tokens.ttl(),
        state.settings.secure_cookies,
        SameSite::Strict,
    );

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(TokenResponse {
            token: outcome.token,
            user: outcome.user.into(),
        }),
    )
}
