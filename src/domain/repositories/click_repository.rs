//! Repository trait for click analytics.

use crate::domain::entities::{Click, NewClick, UrlStats};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only click storage plus the read queries analytics needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click.
    async fn append(&self, click: NewClick) -> Result<(), AppError>;

    /// Lists clicks for a URL, newest first.
    async fn list_for_url(
        &self,
        url_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Click>, AppError>;

    /// Aggregated counters: total, distinct IPs, last click time.
    async fn stats_for_url(&self, url_id: i64) -> Result<UrlStats, AppError>;

    /// Total number of recorded clicks across all URLs.
    async fn count_all(&self) -> Result<i64, AppError>;
}
