//! Short URL creation, allocation and owner management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{NewUrlRecord, UrlDraft, UrlPatch, UrlRecord};
use crate::domain::repositories::{InsertUrlError, UrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, validate_alias};
use crate::utils::url_normalizer::normalize_url;

/// Upper bound on random code attempts before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 10;

/// Upper bound on `limit` for owner listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Service for creating and managing shortened URLs.
///
/// Uniqueness of codes is ultimately enforced by the repository: the existence
/// check here only avoids needless insert attempts, and a unique violation on
/// insert is handled as a lost race.
pub struct LinkService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: CodeGenerator,
    max_url_length: usize,
}

impl<R: UrlRepository + ?Sized> LinkService<R> {
    pub fn new(repository: Arc<R>, generator: CodeGenerator, max_url_length: usize) -> Self {
        Self {
            repository,
            generator,
            max_url_length,
        }
    }

    /// Validates and normalizes a draft, then allocates a code for it.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed URL, an expiry in the past or
    ///   an invalid alias
    /// - see [`allocate`](Self::allocate) for allocation failures
    pub async fn create_url(
        &self,
        mut draft: UrlDraft,
        custom_alias: Option<&str>,
    ) -> Result<UrlRecord, AppError> {
        draft.original_url = self.normalize(&draft.original_url)?;
        ensure_future_expiry(draft.expires_at)?;

        self.allocate(custom_alias, draft).await
    }

    /// Stores `draft` under a custom alias or a fresh random code.
    ///
    /// An empty or whitespace-only alias means no alias.
    ///
    /// # Errors
    ///
    /// - `invalid_alias` if the alias breaks the alias policy
    /// - `alias_taken` if the alias is already used as a code or alias
    /// - `exhausted_retries` after [`MAX_ALLOCATION_ATTEMPTS`] random collisions
    pub async fn allocate(
        &self,
        custom_alias: Option<&str>,
        draft: UrlDraft,
    ) -> Result<UrlRecord, AppError> {
        match custom_alias.filter(|alias| !alias.trim().is_empty()) {
            Some(alias) => self.allocate_alias(alias, draft).await,
            None => self.allocate_random(draft).await,
        }
    }

    async fn allocate_alias(&self, alias: &str, draft: UrlDraft) -> Result<UrlRecord, AppError> {
        validate_alias(alias)?;

        if self.repository.exists(alias).await? {
            return Err(AppError::alias_taken(alias));
        }

        let new_url = NewUrlRecord {
            short_code: alias.to_string(),
            custom_alias: Some(alias.to_string()),
            draft,
        };

        match self.repository.insert(new_url).await {
            Ok(record) => Ok(record),
            Err(InsertUrlError::UniqueViolation) => Err(AppError::alias_taken(alias)),
            Err(InsertUrlError::Other(e)) => Err(e),
        }
    }

    async fn allocate_random(&self, draft: UrlDraft) -> Result<UrlRecord, AppError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let code = self.generator.generate();

            if self.repository.exists(&code).await? {
                debug!(attempt, "Short code collision, regenerating");
                continue;
            }

            let new_url = NewUrlRecord {
                short_code: code,
                custom_alias: None,
                draft: draft.clone(),
            };

            match self.repository.insert(new_url).await {
                Ok(record) => return Ok(record),
                Err(InsertUrlError::UniqueViolation) => {
                    debug!(attempt, "Short code taken concurrently, regenerating");
                }
                Err(InsertUrlError::Other(e)) => return Err(e),
            }
        }

        warn!(
            attempts = MAX_ALLOCATION_ATTEMPTS,
            length = self.generator.length(),
            "Short code allocation exhausted its attempts"
        );
        Err(AppError::exhausted_retries(MAX_ALLOCATION_ATTEMPTS))
    }

    /// Lists the owner's active URLs with the total count.
    ///
    /// `limit` is clamped to `1..=100` and `offset` to `>= 0`.
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UrlRecord>, i64), AppError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = offset.max(0);

        let items = self
            .repository
            .list_by_owner(owner_id, limit, offset)
            .await?;
        let total = self.repository.count_by_owner(owner_id).await?;

        Ok((items, total))
    }

    /// Fetches one of the owner's active URLs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown ids and for URLs owned by
    /// someone else.
    pub async fn get_for_owner(&self, id: i64, owner_id: i64) -> Result<UrlRecord, AppError> {
        self.repository
            .find_for_owner(id, owner_id)
            .await?
            .ok_or_else(|| url_not_found(id))
    }

    /// Applies an owner's patch. A new target URL is normalized first and a new
    /// expiry must lie in the future.
    pub async fn update_for_owner(
        &self,
        id: i64,
        owner_id: i64,
        mut patch: UrlPatch,
    ) -> Result<UrlRecord, AppError> {
        if let Some(url) = patch.original_url.as_deref() {
            patch.original_url = Some(self.normalize(url)?);
        }
        ensure_future_expiry(patch.expires_at)?;

        self.repository
            .update(id, owner_id, patch)
            .await?
            .ok_or_else(|| url_not_found(id))
    }

    /// Soft-deletes an owner's URL. It stops resolving immediately.
    pub async fn delete_for_owner(&self, id: i64, owner_id: i64) -> Result<(), AppError> {
        if self.repository.deactivate(id, owner_id).await? {
            Ok(())
        } else {
            Err(url_not_found(id))
        }
    }

    fn normalize(&self, url: &str) -> Result<String, AppError> {
        normalize_url(url, self.max_url_length).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })
    }
}

fn url_not_found(id: i64) -> AppError {
    AppError::not_found("URL not found", json!({ "id": id }))
}

fn ensure_future_expiry(expires_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match expires_at {
        Some(expires_at) if expires_at <= Utc::now() => Err(AppError::bad_request(
            "Expiration time must be in the future",
            json!({ "expires_at": expires_at }),
        )),
        _ => Ok(()),
    }
}
