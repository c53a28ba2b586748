//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlPatch, UrlRecord};
use crate::domain::repositories::{InsertUrlError, UrlRepository};
use crate::error::AppError;

const URL_COLUMNS: &str = "id, original_url, short_code, custom_alias, owner_id, title, \
     description, expires_at, is_active, created_at, updated_at";

/// PostgreSQL repository for shortened URLs.
///
/// The `urls_short_code_key` and `urls_custom_alias_key` constraints are the
/// final arbiter of code uniqueness.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM urls WHERE short_code = $1 OR custom_alias = $1)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn insert(&self, new_url: NewUrlRecord) -> Result<UrlRecord, InsertUrlError> {
        let sql = format!(
            r#"
            INSERT INTO urls (original_url, short_code, custom_alias, owner_id, title, description, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {URL_COLUMNS}
            "#
        );

        let draft = new_url.draft;
        sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(draft.original_url)
            .bind(new_url.short_code)
            .bind(new_url.custom_alias)
            .bind(draft.owner_id)
            .bind(draft.title)
            .bind(draft.description)
            .bind(draft.expires_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    InsertUrlError::UniqueViolation
                }
                other => InsertUrlError::Other(other.into()),
            })
    }

    async fn find_active_by_code_or_alias(
        &self,
        code: &str,
    ) -> Result<Option<UrlRecord>, AppError> {
        let sql = format!(
            "SELECT {URL_COLUMNS} FROM urls \
             WHERE (short_code = $1 OR custom_alias = $1) AND is_active \
             LIMIT 1"
        );

        let row = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row)
    }

    async fn find_for_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<UrlRecord>, AppError> {
        let sql = format!(
            "SELECT {URL_COLUMNS} FROM urls WHERE id = $1 AND owner_id = $2 AND is_active"
        );

        let row = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UrlRecord>, AppError> {
        let sql = format!(
            "SELECT {URL_COLUMNS} FROM urls \
             WHERE owner_id = $1 AND is_active \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows)
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE owner_id = $1 AND is_active")
                .bind(owner_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: UrlPatch,
    ) -> Result<Option<UrlRecord>, AppError> {
        let sql = format!(
            r#"
            UPDATE urls SET
                original_url = COALESCE($3, original_url),
                title        = COALESCE($4, title),
                description  = COALESCE($5, description),
                expires_at   = COALESCE($6, expires_at),
                updated_at   = now()
            WHERE id = $1 AND owner_id = $2 AND is_active
            RETURNING {URL_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UrlRecord>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(patch.original_url)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.expires_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row)
    }

    async fn deactivate(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE urls SET is_active = FALSE, updated_at = now() \
             WHERE id = $1 AND owner_id = $2 AND is_active",
        )
        .bind(id)
        .bind(owner_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_active(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE is_active")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
