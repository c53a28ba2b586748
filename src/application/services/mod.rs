//! Business logic services for the application layer.

pub mod analytics_service;
pub mod auth_service;
pub mod link_service;
pub mod redirect_service;
pub mod session_service;
pub mod token_service;

pub use analytics_service::{AnalyticsService, UrlAnalytics};
pub use auth_service::{AuthOutcome, AuthService};
pub use link_service::{LinkService, MAX_PAGE_SIZE};
pub use redirect_service::RedirectService;
pub use session_service::{OAuthStart, SessionGrant, SessionService};
pub use token_service::{Claims, TokenService};
