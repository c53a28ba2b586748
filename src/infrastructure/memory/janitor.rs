//! Cancellable periodic cleanup task bound to an in-memory store.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// A store that can evict its own stale entries.
pub trait Sweep: Send + Sync + 'static {
    /// Removes stale entries and returns how many were evicted.
    fn sweep(&self) -> usize;
}

/// Handle to a running janitor task.
///
/// The task holds only a [`Weak`] reference to its store, so it never keeps the
/// store alive. It stops on the first of:
///
/// - [`Janitor::shutdown`] (or dropping this handle)
/// - the store being dropped
pub struct Janitor {
    name: &'static str,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Spawns a janitor that calls [`Sweep::sweep`] every `period`.
    ///
    /// The first sweep happens one full period after spawning.
    pub fn spawn<T: Sweep>(name: &'static str, target: Weak<T>, period: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = tick.tick() => {
                        let Some(store) = target.upgrade() else { break };
                        let evicted = store.sweep();
                        if evicted > 0 {
                            debug!(janitor = name, evicted, "Janitor sweep");
                        }
                    }
                }
            }

            debug!(janitor = name, "Janitor stopped");
        });

        Self {
            name,
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Signals the task to stop and waits until it has exited.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(janitor = self.name, error = %e, "Janitor task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        // Dropping the sender wakes the task, which then exits on its own.
        self.stop.take();
    }
}
