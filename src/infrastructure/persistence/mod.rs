//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx with
//! bound parameters.
//!
//! - [`PgUrlRepository`] - Short URL storage
//! - [`PgClickRepository`] - Click recording and analytics queries
//! - [`PgUserRepository`] - Accounts

pub mod pg_click_repository;
pub mod pg_url_repository;
pub mod pg_user_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_url_repository::PgUrlRepository;
pub use pg_user_repository::PgUserRepository;
