//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AnalyticsService, AuthService, LinkService, RedirectService, SessionService, TokenService,
};
use crate::config::Config;
use crate::domain::click_worker::ClickRecorder;
use crate::domain::oauth::OAuthProvider;
use crate::domain::repositories::{ClickRepository, UrlRepository, UserRepository};
use crate::infrastructure::memory::{RateLimiter, SessionStore};
use crate::utils::code_generator::CodeGenerator;
use crate::utils::state_token::StateTokenSigner;

/// Storage backends behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub urls: Arc<dyn UrlRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Request-level settings derived from [`Config`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub secure_cookies: bool,
    pub behind_proxy: bool,
    pub short_code_length: usize,
    pub max_url_length: usize,
    pub jwt_secret: String,
    pub session_secret: String,
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secure_cookies: config.is_production(),
            behind_proxy: config.behind_proxy,
            short_code_length: config.short_code_length,
            max_url_length: config.max_url_length,
            jwt_secret: config.jwt_secret.clone(),
            session_secret: config.session_secret.clone(),
        }
    }

    /// Full public URL for a short code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}

/// Long-lived components owned by the server and shared with handlers.
pub struct Runtime {
    pub recorder: ClickRecorder,
    pub rate_limiter: Arc<RateLimiter>,
    pub sessions: Arc<SessionStore>,
    pub oauth: Option<Arc<dyn OAuthProvider>>,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<HttpSettings>,
    pub url_repository: Arc<dyn UrlRepository>,
    pub link_service: Arc<LinkService<dyn UrlRepository>>,
    pub redirect_service: Arc<RedirectService<dyn UrlRepository>>,
    pub analytics_service: Arc<AnalyticsService<dyn UrlRepository, dyn ClickRepository>>,
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    pub session_service: Arc<SessionService<dyn UserRepository>>,
    pub tokens: Arc<TokenService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub sessions: Arc<SessionStore>,
    pub click_recorder: ClickRecorder,
}

impl AppState {
    pub fn new(repos: Repositories, settings: HttpSettings, runtime: Runtime) -> Self {
        let tokens = Arc::new(TokenService::new(&settings.jwt_secret));

        let link_service = LinkService::new(
            repos.urls.clone(),
            CodeGenerator::new(settings.short_code_length),
            settings.max_url_length,
        );
        let redirect_service = RedirectService::new(repos.urls.clone(), runtime.recorder.clone());
        let analytics_service = AnalyticsService::new(repos.urls.clone(), repos.clicks.clone());
        let auth_service = Arc::new(AuthService::new(repos.users.clone(), tokens.clone()));
        let session_service = SessionService::new(
            runtime.sessions.clone(),
            auth_service.clone(),
            StateTokenSigner::new(settings.session_secret.as_bytes()),
            runtime.oauth,
        );

        Self {
            settings: Arc::new(settings),
            url_repository: repos.urls,
            link_service: Arc::new(link_service),
            redirect_service: Arc::new(redirect_service),
            analytics_service: Arc::new(analytics_service),
            auth_service,
            session_service: Arc::new(session_service),
            tokens,
            rate_limiter: runtime.rate_limiter,
            sessions: runtime.sessions,
            click_recorder: runtime.recorder,
        }
    }
}
