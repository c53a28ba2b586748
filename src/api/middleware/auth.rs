//! Request identity resolution.
//!
//! [`layer`] runs on every API request and attaches an [`Identity`] extension
//! when the caller presents valid credentials. It never rejects on its own:
//! routes opt into authentication through the [`CurrentUser`] extractor, while
//! [`MaybeUser`] serves routes where login is optional.
//!
//! Credentials are tried in order:
//!
//! 1. `Authorization: Bearer <jwt>`
//! 2. `token` cookie holding a JWT
//! 3. `session_id` cookie looked up in the session store

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookies::{SESSION_COOKIE, TOKEN_COOKIE, read_cookie};

/// How the caller authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Token,
    Session,
}

/// Authenticated caller, stored as a request extension.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub source: AuthSource,
}

/// Marker extension set when a session cookie was present but did not resolve.
#[derive(Debug, Clone, Copy)]
struct StaleSession;

pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    match resolve(&st, &mut parts).await {
        Ok(identity) => {
            parts.extensions.insert(identity);
        }
        Err(Some(marker)) => {
            parts.extensions.insert(marker);
        }
        Err(None) => {}
    }

    next.run(Request::from_parts(parts, body)).await
}

async fn resolve(st: &AppState, parts: &mut Parts) -> Result<Identity, Option<StaleSession>> {
    if let Ok(AuthBearer(token)) = AuthBearer::from_request_parts(parts, &()).await {
        return identity_from_token(st, &token).ok_or(None);
    }

    if let Some(token) = read_cookie(&parts.headers, TOKEN_COOKIE)
        && let Some(identity) = identity_from_token(st, &token)
    {
        return Ok(identity);
    }

    let Some(session_id) = read_cookie(&parts.headers, SESSION_COOKIE) else {
        return Err(None);
    };

    match st.sessions.get_session(&session_id) {
        Some(session) => Ok(Identity {
            user_id: session.user_id,
            email: session.email,
            source: AuthSource::Session,
        }),
        None => {
            debug!("Session cookie did not resolve");
            Err(Some(StaleSession))
        }
    }
}

fn identity_from_token(st: &AppState, token: &str) -> Option<Identity> {
    let claims = st.tokens.verify(token).ok()?;
    let user_id = claims.user_id().ok()?;

    Some(Identity {
        user_id,
        email: claims.email,
        source: AuthSource::Token,
    })
}

/// Extractor that requires an authenticated caller.
///
/// Rejects with `session_invalid_or_expired` when the only credential was a
/// dead session cookie, and with `unauthorized` otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(Self(identity.clone()));
        }

        if parts.extensions.get::<StaleSession>().is_some() {
            return Err(AppError::session_invalid());
        }

        Err(AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "Authentication required" }),
        ))
    }
}

/// Extractor that requires a caller authenticated by JWT.
///
/// A session cookie alone is rejected, so a session cannot be exchanged for a
/// token that outlives it.
#[derive(Debug, Clone)]
pub struct TokenUser(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for TokenUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(identity) = CurrentUser::from_request_parts(parts, state).await?;

        if identity.source != AuthSource::Token {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "A bearer token is required" }),
            ));
        }

        Ok(Self(identity))
    }
}

/// Extractor for routes where authentication is optional.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Identity>().cloned()))
    }
}
