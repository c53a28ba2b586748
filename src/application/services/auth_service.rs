//! Password accounts, JWT login and OAuth user provisioning.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::application::services::token_service::TokenService;
use crate::domain::entities::{NewUser, User};
use crate::domain::oauth::OAuthIdentity;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};

/// A user together with a freshly issued access token.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub token: String,
}

/// Service for account registration and credential checks.
///
/// Password hashing runs on the blocking pool since Argon2 is deliberately slow.
pub struct AuthService<U: UserRepository + ?Sized> {
    users: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U: UserRepository + ?Sized> AuthService<U> {
    pub fn new(users: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates a password account and logs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthOutcome, AppError> {
        let email = email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(
                "User already exists",
                json!({ "email": email }),
            ));
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = self
            .users
            .create(NewUser {
                email,
                name: name.trim().to_string(),
                picture: None,
                password_hash: Some(password_hash),
            })
            .await?;

        info!(user_id = user.id, "User registered");
        self.issue(user)
    }

    /// Checks an email/password pair.
    ///
    /// Unknown emails, OAuth-only accounts and wrong passwords all yield the
    /// same [`AppError::Unauthorized`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or_else(invalid_credentials)?;

        let Some(hash) = user.password_hash.clone() else {
            return Err(invalid_credentials());
        };

        if verify_blocking(password.to_string(), hash).await? {
            Ok(user)
        } else {
            Err(invalid_credentials())
        }
    }

    /// Password login that returns a JWT.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AppError> {
        let user = self.authenticate(email, password).await?;
        self.issue(user)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }

    /// Re-issues a token for an existing user.
    pub async fn refresh(&self, user_id: i64) -> Result<AuthOutcome, AppError> {
        let user = self.get_user(user_id).await?;
        self.issue(user)
    }

    /// Finds or creates the local account for a provider identity.
    pub async fn login_or_register_oauth(
        &self,
        identity: OAuthIdentity,
    ) -> Result<User, AppError> {
        if identity.email.trim().is_empty() {
            return Err(AppError::unauthorized(
                "OAuth provider returned no email",
                json!({}),
            ));
        }

        self.users
            .upsert_oauth_user(NewUser {
                email: identity.email.trim().to_lowercase(),
                name: identity.name,
                picture: identity.picture,
                password_hash: None,
            })
            .await
    }

    fn issue(&self, user: User) -> Result<AuthOutcome, AppError> {
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(AuthOutcome { user, token })
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials", json!({}))
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(blocking_failed)?
        .map_err(|e| {
            AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
        })
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(blocking_failed)?
        .map_err(|e| {
            AppError::internal("Stored password hash is invalid", json!({ "reason": e.to_string() }))
        })
}

fn blocking_failed(e: tokio::task::JoinError) -> AppError {
    AppError::internal("Password task failed", json!({ "reason": e.to_string() }))
}
