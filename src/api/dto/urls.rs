//! DTOs for short URL endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{UrlDraft, UrlPatch, UrlRecord};
use crate::state::HttpSettings;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    /// Target URL. A missing scheme defaults to `https://`.
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,

    /// Optional custom alias. Policy checks happen during allocation.
    pub custom_alias: Option<String>,

    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// After this time the link answers 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateUrlRequest {
    pub fn into_draft(self, owner_id: Option<i64>) -> (UrlDraft, Option<String>) {
        (
            UrlDraft {
                original_url: self.url,
                owner_id,
                title: self.title,
                description: self.description,
                expires_at: self.expires_at,
            },
            self.custom_alias,
        )
    }
}

/// Partial update of an owned URL. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUrlRequest {
    #[validate(length(min = 1))]
    pub url: Option<String>,

    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,
}

impl From<UpdateUrlRequest> for UrlPatch {
    fn from(req: UpdateUrlRequest) -> Self {
        Self {
            original_url: req.url,
            title: req.title,
            description: req.description,
            expires_at: req.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlResponse {
    pub fn from_record(record: UrlRecord, settings: &HttpSettings) -> Self {
        Self {
            short_url: settings.short_url(&record.short_code),
            id: record.id,
            original_url: record.original_url,
            short_code: record.short_code,
            custom_alias: record.custom_alias,
            title: record.title,
            description: record.description,
            expires_at: record.expires_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UrlListResponse {
    pub items: Vec<UrlResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Public view of a link returned by the info endpoint.
#[derive(Debug, Serialize)]
pub struct UrlInfoResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
