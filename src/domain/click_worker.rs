//! Fire-and-forget click recording.
//!
//! [`ClickRecorder`] is the producer side used by the redirect handler. It only
//! ever calls `try_send`, so a slow or failing database can never delay a
//! redirect. [`run_click_worker`] is the consumer: it enriches each event with
//! user-agent classification and appends it through [`ClickRepository`].
//!
//! Delivery is at-most-once. A full queue drops the event; a failed write is
//! logged and counted, never retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::utils::user_agent::classify;

/// Producer handle for click events. Cheap to clone.
#[derive(Clone)]
pub struct ClickRecorder {
    tx: mpsc::Sender<ClickEvent>,
    dropped: Arc<AtomicU64>,
}

impl ClickRecorder {
    /// Creates a recorder together with the receiving end for the worker.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// Hands an event to the worker without waiting.
    ///
    /// Returns false if the event was dropped because the queue is full or the
    /// worker has stopped.
    pub fn dispatch(&self, event: ClickEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(ev)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(url_id = ev.url_id, "Click queue is full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(url_id = ev.url_id, "Click worker stopped, dropping event");
                false
            }
        }
    }

    /// Number of events dropped since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// True once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Converts an event into a persisted click, classifying its user agent.
pub fn to_new_click(event: ClickEvent) -> NewClick {
    let info = classify(event.user_agent.as_deref().unwrap_or_default());

    NewClick {
        url_id: event.url_id,
        ip_address: event.ip,
        user_agent: event.user_agent,
        referrer: event.referrer,
        device: info.device.to_string(),
        os: info.os.to_string(),
        browser: info.browser.to_string(),
        clicked_at: event.clicked_at,
    }
}

/// Persists a single click event.
pub async fn record_click<R>(repo: &R, event: ClickEvent) -> Result<(), AppError>
where
    R: ClickRepository + ?Sized,
{
    let url_id = event.url_id;
    repo.append(to_new_click(event)).await?;
    debug!(url_id, "Click recorded");
    Ok(())
}

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` writes run at once. When the channel closes, writes
/// already in flight are awaited before returning, so a graceful shutdown
/// loses only events that were never accepted.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    repo: Arc<R>,
    concurrency: usize,
) where
    R: ClickRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    info!(concurrency, "Click worker started");

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repo = repo.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            let url_id = event.url_id;
            match record_click(repo.as_ref(), event).await {
                Ok(()) => metrics::counter!("clicks_recorded_total").increment(1),
                Err(e) => {
                    metrics::counter!("clicks_failed_total").increment(1);
                    error!(url_id, error = %e, "Failed to record click");
                }
            }
        });

        // Reap finished tasks so the set does not grow without bound.
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}
