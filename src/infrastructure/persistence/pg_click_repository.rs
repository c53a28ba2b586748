//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, NewClick, UrlStats};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn append(&self, click: NewClick) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO clicks (url_id, ip_address, user_agent, referrer, device, os, browser, clicked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(click.url_id)
        .bind(click.ip_address)
        .bind(click.user_agent)
        .bind(click.referrer)
        .bind(click.device)
        .bind(click.os)
        .bind(click.browser)
        .bind(click.clicked_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn list_for_url(
        &self,
        url_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, Click>(
            r#"
            SELECT id, url_id, ip_address, user_agent, referrer, device, os, browser, clicked_at
            FROM clicks
            WHERE url_id = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(url_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn stats_for_url(&self, url_id: i64) -> Result<UrlStats, AppError> {
        let stats = sqlx::query_as::<_, UrlStats>(
            r#"
            SELECT
                $1::bigint                  AS url_id,
                COUNT(*)                    AS total_clicks,
                COUNT(DISTINCT ip_address)  AS unique_clicks,
                MAX(clicked_at)             AS last_clicked
            FROM clicks
            WHERE url_id = $1
            "#,
        )
        .bind(url_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(stats)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
