//! In-memory session store with TTL and background cleanup.
//!
//! Sessions live only in process memory: a restart signs everyone out.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::janitor::{Janitor, Sweep};
use crate::error::AppError;

/// Lifetime of a session.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How often expired sessions are swept.
pub const JANITOR_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Raw entropy per session id. 32 bytes = 256 bits.
const SESSION_ID_BYTES: usize = 32;

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Monotonic creation instant used for TTL checks.
    started: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.started) >= ttl
    }
}

/// Concurrent map of session id to [`Session`].
///
/// Every read that finds an expired session removes it inside the same
/// `DashMap` entry lock, so no caller can observe a session past its TTL even
/// if the janitor has not run yet.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    janitor: Mutex<Option<Janitor>>,
}

impl SessionStore {
    /// Creates a store without a janitor.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            janitor: Mutex::new(None),
        }
    }

    /// Creates a store with the default TTL and starts its hourly janitor.
    pub fn start() -> Arc<Self> {
        let store = Arc::new(Self::new(SESSION_TTL));
        let janitor = Janitor::spawn("session_store", Arc::downgrade(&store), JANITOR_PERIOD);
        *store.janitor.lock() = Some(janitor);
        store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a new session and returns its id together with its expiry time.
    ///
    /// # Errors
    ///
    /// Returns a `session_creation_failed` error if the OS entropy source
    /// fails.
    pub fn create_session(
        &self,
        user_id: i64,
        email: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        getrandom::fill(&mut bytes).map_err(|e| AppError::session_creation(e.to_string()))?;
        let id = URL_SAFE_NO_PAD.encode(bytes);

        let created_at = Utc::now();
        let expires_at = created_at
            + chrono::Duration::from_std(self.ttl)
                .map_err(|e| AppError::session_creation(e.to_string()))?;

        self.sessions.insert(
            id.clone(),
            Session {
                id: id.clone(),
                user_id,
                email: email.to_string(),
                created_at,
                started: Instant::now(),
            },
        );

        debug!(user_id, "Session created");
        Ok((id, expires_at))
    }

    /// Returns the session if it exists and is younger than the TTL.
    ///
    /// An expired session is deleted as part of the same lookup.
    pub fn get_session(&self, id: &str) -> Option<Session> {
        if id.is_empty() {
            return None;
        }

        let now = Instant::now();
        match self.sessions.entry(id.to_owned()) {
            Entry::Occupied(entry) if entry.get().is_expired(now, self.ttl) => {
                entry.remove();
                metrics::counter!("sessions_expired_total").increment(1);
                None
            }
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(_) => None,
        }
    }

    /// Removes a session. Unknown ids are ignored.
    pub fn destroy_session(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            debug!("Session destroyed");
        }
    }

    /// Removes all expired sessions and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0;

        self.sessions.retain(|_, session| {
            let expired = session.is_expired(now, self.ttl);
            if expired {
                purged += 1;
            }
            !expired
        });

        if purged > 0 {
            metrics::counter!("sessions_expired_total").increment(purged as u64);
        }
        purged
    }

    /// Number of sessions held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Stops the janitor, if one is running, and waits for it to exit.
    pub async fn shutdown(&self) {
        let janitor = self.janitor.lock().take();
        if let Some(janitor) = janitor {
            janitor.shutdown().await;
            info!("Session store janitor stopped");
        }
    }
}

impl Sweep for SessionStore {
    fn sweep(&self) -> usize {
        self.purge_expired()
    }
}
