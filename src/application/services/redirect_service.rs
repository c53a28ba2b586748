//! Code resolution and the redirect hot path.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::domain::click_event::{ClickContext, ClickEvent};
use crate::domain::click_worker::ClickRecorder;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Resolves short codes and hands clicks to the recorder.
///
/// Records are read from the repository on every call; nothing is cached.
pub struct RedirectService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    recorder: ClickRecorder,
}

impl<R: UrlRepository + ?Sized> RedirectService<R> {
    pub fn new(repository: Arc<R>, recorder: ClickRecorder) -> Self {
        Self {
            repository,
            recorder,
        }
    }

    /// Looks up an active record by short code or custom alias.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no active record matches
    /// - [`AppError::Gone`] (`expired`) if the record's expiry has passed, even
    ///   though it is still marked active
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, AppError> {
        let record = self
            .repository
            .find_active_by_code_or_alias(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if record.is_expired_at(Utc::now()) {
            return Err(AppError::expired(code));
        }

        Ok(record)
    }

    /// Resolves `code` and dispatches a click without waiting for it to be
    /// stored.
    pub async fn redirect(&self, code: &str, ctx: ClickContext) -> Result<UrlRecord, AppError> {
        let record = self.resolve(code).await?;

        if !self.recorder.dispatch(ClickEvent::from_context(record.id, ctx)) {
            debug!(code, "Click not recorded");
        }

        Ok(record)
    }
}
