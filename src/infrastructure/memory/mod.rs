//! Process-local state with background cleanup.
//!
//! - [`RateLimiter`] - Sliding-window request limiter keyed by client
//! - [`SessionStore`] - Server-side sessions with a fixed TTL
//!
//! Both own their map exclusively and run a [`janitor::Janitor`] that is
//! stopped with an explicit `shutdown()`.

pub mod janitor;
pub mod rate_limiter;
pub mod session_store;

pub use rate_limiter::RateLimiter;
pub use session_store::{Session, SessionStore};
