//! OAuth identity provider port.
//!
//! The code exchange and user-info fetch are performed by an external provider
//! client. This crate only issues and verifies the `state` parameter and turns
//! the returned identity into a local user and session.

use async_trait::async_trait;

use crate::error::AppError;

/// Identity returned by a provider after a successful code exchange.
#[derive(Debug, Clone)]
pub struct OAuthIdentity {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL the browser is sent to, carrying `state` back on the callback.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the user's identity.
    async fn exchange_code(&self, code: &str) -> Result<OAuthIdentity, AppError>;
}
