//! Per-URL click analytics for owners.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Click, UrlRecord, UrlStats};
use crate::domain::repositories::{ClickRepository, UrlRepository};
use crate::error::AppError;

/// Maximum number of individual clicks returned with analytics.
pub const ANALYTICS_CLICK_LIMIT: i64 = 1000;

/// A URL together with its counters and most recent clicks.
#[derive(Debug, Clone)]
pub struct UrlAnalytics {
    pub url: UrlRecord,
    pub stats: UrlStats,
    pub clicks: Vec<Click>,
}

pub struct AnalyticsService<U, C>
where
    U: UrlRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    urls: Arc<U>,
    clicks: Arc<C>,
}

impl<U, C> AnalyticsService<U, C>
where
    U: UrlRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    pub fn new(urls: Arc<U>, clicks: Arc<C>) -> Self {
        Self { urls, clicks }
    }

    /// Returns analytics for a URL owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the URL does not exist, is inactive or
    /// belongs to someone else.
    pub async fn url_analytics(
        &self,
        url_id: i64,
        owner_id: i64,
    ) -> Result<UrlAnalytics, AppError> {
        let url = self
            .urls
            .find_for_owner(url_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "id": url_id })))?;

        let stats = self.clicks.stats_for_url(url.id).await?;
        let clicks = self
            .clicks
            .list_for_url(url.id, ANALYTICS_CLICK_LIMIT, 0)
            .await?;

        Ok(UrlAnalytics { url, stats, clicks })
    }

    /// Counters only, without ownership checks. Used by the public info
    /// endpoint.
    pub async fn stats(&self, url_id: i64) -> Result<UrlStats, AppError> {
        self.clicks.stats_for_url(url_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockClickRepository, MockUrlRepository};
    use chrono::Utc;

    fn record(id: i64, owner_id: i64) -> UrlRecord {
        let now = Utc::now();
        UrlRecord {
            id,
            original_url: "https://example.com/".to_string(),
            short_code: "abc123".to_string(),
            custom_alias: None,
            owner_id: Some(owner_id),
            title: None,
            description: None,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_url_analytics() {
        let mut urls = MockUrlRepository::new();
        urls.expect_find_for_owner()
            .withf(|id, owner| *id == 4 && *owner == 9)
            .times(1)
            .returning(|id, owner| Ok(Some(record(id, owner))));

        let mut clicks = MockClickRepository::new();
        clicks.expect_stats_for_url().times(1).returning(|id| {
            Ok(UrlStats {
                url_id: id,
                total_clicks: 3,
                unique_clicks: 2,
                last_clicked: Some(Utc::now()),
            })
        });
        clicks
            .expect_list_for_url()
            .withf(|id, limit, offset| {
                *id == 4 && *limit == ANALYTICS_CLICK_LIMIT && *offset == 0
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let service = AnalyticsService::new(Arc::new(urls), Arc::new(clicks));
        let analytics = service.url_analytics(4, 9).await.unwrap();

        assert_eq!(analytics.url.id, 4);
        assert_eq!(analytics.stats.total_clicks, 3);
        assert_eq!(analytics.stats.unique_clicks, 2);
    }

    #[tokio::test]
    async fn test_url_analytics_other_owner_is_not_found() {
        let mut urls = MockUrlRepository::new();
        urls.expect_find_for_owner().returning(|_, _| Ok(None));
        let mut clicks = MockClickRepository::new();
        clicks.expect_stats_for_url().times(0);

        let service = AnalyticsService::new(Arc::new(urls), Arc::new(clicks));
        let err = service.url_analytics(4, 10).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
