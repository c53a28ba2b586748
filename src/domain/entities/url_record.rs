//! Short URL record entity.

use chrono::{DateTime, Utc};

/// A shortened URL as stored in the `urls` table.
///
/// `short_code` is unique across all records. When the creator picked a custom
/// alias, `short_code` holds the alias too, so one constraint covers both
/// namespaces. Records are never hard-deleted: deletion clears `is_active`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub owner_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Returns true if `expires_at` is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Everything needed to insert a record except the short code.
#[derive(Debug, Clone, Default)]
pub struct UrlDraft {
    pub original_url: String,
    pub owner_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Insert payload: a draft plus its allocated code.
#[derive(Debug, Clone)]
pub struct NewUrlRecord {
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub draft: UrlDraft,
}

/// Owner-initiated partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UrlPatch {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> UrlRecord {
        let now = Utc::now();
        UrlRecord {
            id: 1,
            original_url: "https://example.com/".to_string(),
            short_code: "abc123".to_string(),
            custom_alias: None,
            owner_id: None,
            title: None,
            description: None,
            expires_at,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_no_expiry_never_expires() {
        assert!(!record(None).is_expired());
    }

    #[test]
    fn test_past_expiry() {
        assert!(record(Some(Utc::now() - Duration::seconds(1))).is_expired());
    }

    #[test]
    fn test_future_expiry() {
        assert!(!record(Some(Utc::now() + Duration::hours(1))).is_expired());
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let at = Utc::now();
        assert!(record(Some(at)).is_expired_at(at));
        assert!(!record(Some(at)).is_expired_at(at - Duration::milliseconds(1)));
    }
}
