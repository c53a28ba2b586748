//! Click event model for asynchronous click recording.

use chrono::{DateTime, Utc};

/// Request metadata captured at redirect time.
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// An in-memory click, captured in the redirect handler and handed to the
/// background worker over a bounded channel.
///
/// The redirect response never waits on this event: it is created from data
/// already at hand (the resolved URL id and request headers) and the handler
/// moves on regardless of whether the event is accepted.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub url_id: i64,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates an event stamped with the current time.
    pub fn new(
        url_id: i64,
        ip: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            url_id,
            ip,
            user_agent: user_agent.map(str::to_string),
            referrer: referrer.map(str::to_string),
            clicked_at: Utc::now(),
        }
    }

    /// Creates an event for `url_id` from request metadata.
    pub fn from_context(url_id: i64, ctx: ClickContext) -> Self {
        Self {
            url_id,
            ip: ctx.ip,
            user_agent: ctx.user_agent,
            referrer: ctx.referrer,
            clicked_at: Utc::now(),
        }
    }
}
