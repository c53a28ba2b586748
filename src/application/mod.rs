//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the in-memory stores and give HTTP
//! handlers a narrow API.
//!
//! - [`services::link_service::LinkService`] - Code allocation and owner CRUD
//! - [`services::redirect_service::RedirectService`] - Resolution and click dispatch
//! - [`services::analytics_service::AnalyticsService`] - Per-URL analytics
//! - [`services::auth_service::AuthService`] - Password accounts and JWT login
//! - [`services::session_service::SessionService`] - OAuth and cookie sessions
//! - [`services::token_service::TokenService`] - JWT signing

pub mod services;
