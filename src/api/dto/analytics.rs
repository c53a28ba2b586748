//! DTOs for analytics endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::dto::urls::UrlResponse;
use crate::application::services::UrlAnalytics;
use crate::domain::entities::{Click, UrlStats};
use crate::state::HttpSettings;

#[derive(Debug, Serialize)]
pub struct ClickItem {
    pub clicked_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub device: String,
    pub os: String,
    pub browser: String,
}

impl From<Click> for ClickItem {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            ip_address: click.ip_address,
            referrer: click.referrer,
            device: click.device,
            os: click.os,
            browser: click.browser,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub url: UrlResponse,
    pub stats: UrlStats,
    pub clicks: Vec<ClickItem>,
}

impl AnalyticsResponse {
    pub fn new(analytics: UrlAnalytics, settings: &HttpSettings) -> Self {
        Self {
            url: UrlResponse::from_record(analytics.url, settings),
            stats: analytics.stats,
            clicks: analytics.clicks.into_iter().map(ClickItem::from).collect(),
        }
    }
}
