//! Repository trait for short URL data access.

use crate::domain::entities::{NewUrlRecord, UrlPatch, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Failure modes of [`UrlRepository::insert`].
///
/// Unique violations are split out so that code allocation can tell a lost
/// race (retry with a new code) apart from a real storage failure.
#[derive(Debug, thiserror::Error)]
pub enum InsertUrlError {
    #[error("short code already taken")]
    UniqueViolation,
    #[error(transparent)]
    Other(#[from] AppError),
}

/// Repository interface for shortened URLs.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Returns true if any record (active or not) uses `code` as its short code
    /// or custom alias.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Inserts a record.
    ///
    /// # Errors
    ///
    /// Returns [`InsertUrlError::UniqueViolation`] if the short code or custom
    /// alias is already stored. This is the authoritative uniqueness check:
    /// callers may pre-check with [`exists`](Self::exists) but must still
    /// handle this error.
    async fn insert(&self, new_url: NewUrlRecord) -> Result<UrlRecord, InsertUrlError>;

    /// Finds an active record whose short code or custom alias equals `code`.
    ///
    /// Expired records are still returned; expiry is decided by the caller.
    async fn find_active_by_code_or_alias(
        &self,
        code: &str,
    ) -> Result<Option<UrlRecord>, AppError>;

    /// Finds an active record by id, restricted to its owner.
    async fn find_for_owner(&self, id: i64, owner_id: i64)
    -> Result<Option<UrlRecord>, AppError>;

    /// Lists an owner's active records, newest first.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UrlRecord>, AppError>;

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError>;

    /// Applies a patch to an owner's record. Returns `None` if not found.
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: UrlPatch,
    ) -> Result<Option<UrlRecord>, AppError>;

    /// Soft-deletes an owner's record. Returns false if nothing matched.
    async fn deactivate(&self, id: i64, owner_id: i64) -> Result<bool, AppError>;

    /// Total number of active records.
    async fn count_active(&self) -> Result<i64, AppError>;

    /// Checks storage connectivity.
    async fn ping(&self) -> Result<(), AppError>;
}
