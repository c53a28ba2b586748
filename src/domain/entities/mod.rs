//! Core domain entities.
//!
//! - [`UrlRecord`] - A shortened URL
//! - [`Click`] - A recorded redirect
//! - [`User`] - An account owning URLs
//!
//! Creation payloads live next to their entity (`NewUrlRecord`, `NewClick`,
//! `NewUser`), as do partial updates (`UrlPatch`).

pub mod click;
pub mod url_record;
pub mod user;

pub use click::{Click, NewClick, UrlStats};
pub use url_record::{NewUrlRecord, UrlDraft, UrlPatch, UrlRecord};
pub use user::{NewUser, User};
