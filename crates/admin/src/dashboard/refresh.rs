//! Periodic background refresh bound to the admin session.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::session::SessionState;

/// Handle to the polling task.
///
/// The task ticks every `period` (the first tick comes one period after
/// spawning) and exits when the session leaves `Authorized`, when
/// [`RefreshTask::stop`] is called, when the tick callback returns `false`,
/// or when this handle is dropped.
#[derive(Debug)]
pub struct RefreshTask {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Spawn the polling loop on the current runtime.
    pub fn spawn<F, Fut>(
        period: Duration,
        mut session: watch::Receiver<SessionState>,
        mut tick: F,
    ) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if !session.borrow_and_update().is_authorized() {
                tracing::debug!("Refresh task not started: session is not authorized");
                return;
            }

            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(period_secs = period.as_secs(), "Refresh task started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::debug!("Refresh task stopped");
                        break;
                    }
                    changed = session.changed() => {
                        if changed.is_err() || !session.borrow_and_update().is_authorized() {
                            tracing::info!("Session ended, stopping refresh task");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if !tick().await {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Whether the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
