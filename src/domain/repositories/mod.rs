//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access and are implemented by concrete
//! repositories in `crate::infrastructure::persistence`. Mock implementations
//! are generated via `mockall` for unit tests.
//!
//! - [`UrlRepository`] - Short URL storage and the uniqueness guarantee
//! - [`ClickRepository`] - Click recording and analytics
//! - [`UserRepository`] - Accounts

pub mod click_repository;
pub mod url_repository;
pub mod user_repository;

pub use click_repository::ClickRepository;
pub use url_repository::{InsertUrlError, UrlRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use url_repository::MockUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
