//! Cookie-session login: OAuth state handling and password login into the
//! in-memory [`SessionStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::application::services::auth_service::AuthService;
use crate::domain::entities::User;
use crate::domain::oauth::OAuthProvider;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::memory::{Session, SessionStore};
use crate::utils::state_token::StateTokenSigner;

/// A newly created session.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Start of an OAuth login: the state to store in a cookie and the provider
/// URL to redirect to.
#[derive(Debug, Clone)]
pub struct OAuthStart {
    pub state: String,
    pub authorization_url: String,
}

pub struct SessionService<U: UserRepository + ?Sized> {
    store: Arc<SessionStore>,
    auth: Arc<AuthService<U>>,
    signer: StateTokenSigner,
    oauth: Option<Arc<dyn OAuthProvider>>,
}

impl<U: UserRepository + ?Sized> SessionService<U> {
    pub fn new(
        store: Arc<SessionStore>,
        auth: Arc<AuthService<U>>,
        signer: StateTokenSigner,
        oauth: Option<Arc<dyn OAuthProvider>>,
    ) -> Self {
        Self {
            store,
            auth,
            signer,
            oauth,
        }
    }

    fn provider(&self) -> Result<&Arc<dyn OAuthProvider>, AppError> {
        self.oauth
            .as_ref()
            .ok_or_else(|| AppError::not_found("OAuth login is not configured", json!({})))
    }

    /// Issues a signed state and builds the provider URL.
    pub fn begin_oauth(&self) -> Result<OAuthStart, AppError> {
        let provider = self.provider()?;
        let state = self.signer.issue()?;
        let authorization_url = provider.authorization_url(&state);

        Ok(OAuthStart {
            state,
            authorization_url,
        })
    }

    /// Verifies the callback state, exchanges the code and opens a session.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] if the state is missing, differs from the
    ///   cookie or fails MAC verification
    /// - whatever the provider's code exchange returns
    pub async fn complete_oauth(
        &self,
        state_cookie: Option<&str>,
        state: &str,
        code: &str,
    ) -> Result<SessionGrant, AppError> {
        let provider = self.provider()?;

        if !self.signer.verify(state_cookie, state) {
            warn!("OAuth callback with invalid state");
            return Err(AppError::unauthorized(
                "Invalid OAuth state",
                json!({ "reason": "state mismatch" }),
            ));
        }

        let identity = provider.exchange_code(code).await?;
        let user = self.auth.login_or_register_oauth(identity).await?;
        self.open(user)
    }

    /// Password login that opens a session instead of issuing a JWT.
    pub async fn password_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionGrant, AppError> {
        let user = self.auth.authenticate(email, password).await?;
        self.open(user)
    }

    /// Resolves the session behind a cookie value.
    ///
    /// # Errors
    ///
    /// Returns `session_invalid_or_expired` for a missing, unknown or expired
    /// session.
    pub fn current(&self, session_id: Option<&str>) -> Result<Session, AppError> {
        session_id
            .and_then(|id| self.store.get_session(id))
            .ok_or_else(AppError::session_invalid)
    }

    /// Destroys the session if there is one. Never fails.
    pub fn logout(&self, session_id: Option<&str>) {
        if let Some(id) = session_id {
            self.store.destroy_session(id);
        }
    }

    pub async fn profile(&self, session_id: Option<&str>) -> Result<User, AppError> {
        let session = self.current(session_id)?;
        self.auth.get_user(session.user_id).await
    }

    fn open(&self, user: User) -> Result<SessionGrant, AppError> {
        let (session_id, expires_at) = self.store.create_session(user.id, &user.email)?;
        info!(user_id = user.id, "Session opened");

        Ok(SessionGrant {
            session_id,
            expires_at,
            user,
        })
    }
}
