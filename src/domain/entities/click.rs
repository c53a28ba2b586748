//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted click on a short URL.
///
/// Append-only fact: never updated, never deduplicated. Two clicks from the same
/// visitor are two rows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Click {
    pub id: i64,
    pub url_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub device: String,
    pub os: String,
    pub browser: String,
    pub clicked_at: DateTime<Utc>,
}

/// Input data for appending a click.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub url_id: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub device: String,
    pub os: String,
    pub browser: String,
    pub clicked_at: DateTime<Utc>,
}

/// Aggregated click counters for one URL.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UrlStats {
    pub url_id: i64,
    pub total_clicks: i64,
    /// Distinct client IPs.
    pub unique_clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
}

impl UrlStats {
    pub fn empty(url_id: i64) -> Self {
        Self {
            url_id,
            total_clicks: 0,
            unique_clicks: 0,
            last_clicked: None,
        }
    }
}
