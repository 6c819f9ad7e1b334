//! Transient operator notifications.
//!
//! There is a single slot. Showing a notification replaces whatever is on
//! screen, and each one dismisses itself after the TTL unless something newer
//! replaced it first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Increases with every notification issued.
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Publishes notifications on a `watch` channel.
///
/// Cheap to clone; clones share the slot and the counters.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

#[derive(Debug)]
struct NotifierInner {
    tx: watch::Sender<Option<Notification>>,
    ttl: Duration,
    seq: AtomicU64,
    successes: AtomicU64,
    errors: AtomicU64,
}

impl Notifier {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(NotifierInner {
                tx,
                ttl,
                seq: AtomicU64::new(0),
                successes: AtomicU64::new(0),
                errors: AtomicU64::new(0),
            }),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.inner.successes.fetch_add(1, Ordering::Relaxed);
        self.show(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.inner.errors.fetch_add(1, Ordering::Relaxed);
        self.show(NotificationKind::Error, message.into());
    }

    fn show(&self, kind: NotificationKind, message: String) {
        let id = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        match kind {
            NotificationKind::Success => tracing::info!(id, %message, "Notification"),
            NotificationKind::Error => tracing::warn!(id, %message, "Notification"),
        }
        self.inner
            .tx
            .send_replace(Some(Notification { id, kind, message }));

        // Outside a runtime the notification simply stays until replaced.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(inner.ttl).await;
            inner.tx.send_if_modified(|current| {
                if current.as_ref().is_some_and(|n| n.id == id) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
        });
    }

    /// The notification on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.inner.tx.borrow().clone()
    }

    /// Clear the slot now.
    pub fn dismiss(&self) {
        self.inner.tx.send_if_modified(|current| current.take().is_some());
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.tx.subscribe()
    }

    /// Success notifications issued so far.
    #[must_use]
    pub fn success_count(&self) -> u64 {
        self.inner.successes.load(Ordering::Relaxed)
    }

    /// Error notifications issued so far.
    #[must_use]
    pub fn error_count(&self) -> u64 {
        self.inner.errors.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3);

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_ttl() {
        let notifier = Notifier::new(TTL);
        notifier.success("Component added");
        assert_eq!(notifier.current().unwrap().message, "Component added");

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(notifier.current().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_replaces_current() {
        let notifier = Notifier::new(TTL);
        notifier.success("first");
        tokio::time::sleep(Duration::from_secs(2)).await;
        notifier.error("second");

        let current = notifier.current().unwrap();
        assert_eq!(current.kind, NotificationKind::Error);
        assert_eq!(current.message, "second");

        // The first timer fires at 3s but must not clear the replacement.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(notifier.current().unwrap().message, "second");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test]
    async fn test_counters_and_dismiss() {
        let notifier = Notifier::new(TTL);
        notifier.success("a");
        notifier.error("b");
        notifier.error("c");
        assert_eq!(notifier.success_count(), 1);
        assert_eq!(notifier.error_count(), 2);
        assert_eq!(notifier.current().unwrap().id, 3);

        notifier.dismiss();
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_without_runtime_stays_until_replaced() {
        let notifier = Notifier::new(TTL);
        notifier.success("saved");
        assert!(notifier.current().is_some());
    }
}
