//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod redirect;
pub mod session;
pub mod urls;

pub use auth::{login_handler, logout_handler, profile_handler, refresh_handler, register_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use session::{
    oauth_callback_handler, oauth_login_handler, session_login_handler, session_logout_handler,
    session_profile_handler,
};
pub use urls::{
    create_url_handler, delete_url_handler, list_urls_handler, update_url_handler,
    url_analytics_handler, url_info_handler,
};
