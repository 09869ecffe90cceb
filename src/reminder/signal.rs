use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

/// Flag telling the session that a reminder is due. Raised only by the
/// [ReminderTimer](super::ReminderTimer), cleared only by the session.
#[derive(Default, Debug)]
pub struct ReminderSignal {
    pending: AtomicBool,
    fired: AtomicU64,
    notify: Notify,
}

impl ReminderSignal {
    pub fn raise(&self) {
        self.pending.store(true, Ordering::Release);
        self.fired.fetch_add(1, Ordering::Relaxed);
        self.notify.notify_one();
    }

    /// Clears the flag, returning whether a reminder was pending.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Number of reminders raised since the signal was created.
    pub fn fired_count(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Completes once the signal is raised. A raise that happened while nobody waited completes
    /// the next call immediately.
    pub async fn raised(&self) {
        self.notify.notified().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ReminderSignal;

    #[tokio::test]
    async fn test_take_pending_clears() {
        let signal = ReminderSignal::default();
        assert!(!signal.take_pending());

        signal.raise();
        assert!(signal.is_pending());
        assert!(signal.take_pending());
        assert!(!signal.take_pending());
        assert_eq!(signal.fired_count(), 1);
    }

    #[tokio::test]
    async fn test_raise_before_wait_is_not_lost() {
        let signal = ReminderSignal::default();
        signal.raise();

        tokio::time::timeout(Duration::from_secs(1), signal.raised())
            .await
            .expect("raised signal should wake the waiter");
    }
}
