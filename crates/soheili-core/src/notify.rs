//! Transient notifications
//!
//! Each notification dismisses itself after [`constants::notify::AUTO_DISMISS`].
//! The auto-dismiss timer runs as a tokio task guarded by a
//! `CancellationToken`; dismissing by hand cancels it, so an element is only
//! ever removed once.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::constants;

/// Type of notification (affects class and icon)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            NotificationKind::Success => "notification notification-success",
            NotificationKind::Error => "notification notification-error",
            NotificationKind::Info => "notification notification-info",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle",
            NotificationKind::Error | NotificationKind::Info => "exclamation-circle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Visible,
    /// Exit animation running, removal pending
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub phase: Phase,
}

#[derive(Debug)]
struct Entry {
    notification: Notification,
    auto_dismiss: CancellationToken,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Entry>,
    removals: u64,
}

/// Live notifications, shared with their timer tasks
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(NotificationKind::Error, message)
    }

    /// Show a notification and start its auto-dismiss timer
    ///
    /// Must be called from inside a tokio runtime for the timer to run;
    /// without one the notification stays until dismissed by hand.
    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        let token = CancellationToken::new();
        let id = {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.entries.push(Entry {
                notification: Notification {
                    id,
                    kind,
                    message: message.into(),
                    phase: Phase::Visible,
                },
                auto_dismiss: token.clone(),
            });
            id
        };
        debug!(id, ?kind, "notification shown");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                handle.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(constants::notify::AUTO_DISMISS) => {
                            if center.begin_leave(id) {
                                debug!(id, "notification expired");
                                tokio::time::sleep(constants::notify::LEAVE_ANIMATION).await;
                                center.remove(id);
                            }
                        }
                    }
                });
            }
            Err(_) => warn!(id, "no runtime, notification will not auto-dismiss"),
        }
        id
    }

    /// Close button. Cancels the auto-dismiss timer and removes the
    /// notification after its exit animation. No-op if it is already leaving
    /// or gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let token = {
            let inner = self.inner.lock();
            match inner.entries.iter().find(|e| e.notification.id == id) {
                Some(entry) if entry.notification.phase == Phase::Visible => {
                    entry.auto_dismiss.clone()
                }
                _ => return false,
            }
        };
        token.cancel();
        if !self.begin_leave(id) {
            return false;
        }
        debug!(id, "notification dismissed");

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(constants::notify::LEAVE_ANIMATION).await;
                    center.remove(id);
                });
            }
            Err(_) => {
                self.remove(id);
            }
        }
        true
    }

    /// Visible -> Leaving. False if the notification is gone or already leaving.
    fn begin_leave(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.entries.iter_mut().find(|e| e.notification.id == id) {
            Some(entry) if entry.notification.phase == Phase::Visible => {
                entry.notification.phase = Phase::Leaving;
                true
            }
            _ => false,
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|e| e.notification.id != id);
        let removed = inner.entries.len() != before;
        if removed {
            inner.removals += 1;
            debug!(id, "notification removed");
        }
        removed
    }

    /// Snapshot of live notifications, oldest first
    pub fn list(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<Notification> {
        self.inner
            .lock()
            .entries
            .iter()
            .find(|e| e.notification.id == id)
            .map(|e| e.notification.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Total number of notifications removed so far
    pub fn removals(&self) -> u64 {
        self.inner.lock().removals
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::advance;

    use super::*;

    /// Let spawned timer tasks observe the advanced clock
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    /// Spawned tasks register their sleeps relative to the clock at first poll,
    /// so settle before moving time too
    async fn advance_ms(ms: u64) {
        settle().await;
        advance(Duration::from_millis(ms)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_five_seconds() {
        let center = NotificationCenter::new();
        let id = center.success("saved");
        settle().await;

        advance_ms(4_900).await;
        assert_eq!(center.get(id).map(|n| n.phase), Some(Phase::Visible));

        advance_ms(200).await;
        assert_eq!(center.get(id).map(|n| n.phase), Some(Phase::Leaving));

        advance_ms(400).await;
        assert!(center.is_empty());
        assert_eq!(center.removals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss_cancels_auto_dismiss() {
        let center = NotificationCenter::new();
        let id = center.error("failed");
        settle().await;

        advance_ms(1_000).await;
        assert!(center.dismiss(id));
        assert_eq!(center.get(id).map(|n| n.phase), Some(Phase::Leaving));

        advance_ms(400).await;
        assert!(center.get(id).is_none());

        // Past the original five second mark: nothing is removed twice
        advance_ms(6_000).await;
        assert_eq!(center.removals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_twice_is_noop() {
        let center = NotificationCenter::new();
        let id = center.success("copied");
        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));
        advance_ms(400).await;
        assert!(!center.dismiss(id));
        assert!(!center.dismiss(9_999));
        assert_eq!(center.removals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_while_leaving_is_noop() {
        let center = NotificationCenter::new();
        let id = center.success("sent");
        settle().await;
        advance_ms(5_100).await;
        assert!(!center.dismiss(id));
        advance_ms(400).await;
        assert_eq!(center.removals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_unique_and_ordered() {
        let center = NotificationCenter::new();
        let a = center.success("a");
        let b = center.error("b");
        assert!(b > a);
        let kinds: Vec<_> = center.list().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);
    }

    #[test]
    fn test_without_runtime_dismiss_removes_immediately() {
        let center = NotificationCenter::new();
        let id = center.success("offline");
        assert!(center.dismiss(id));
        assert!(center.is_empty());
    }

    #[test]
    fn test_kind_presentation() {
        assert_eq!(NotificationKind::Success.icon(), "check-circle");
        assert_eq!(
            NotificationKind::Error.class_name(),
            "notification notification-error"
        );
    }
}
