//! Reorder-completed signal shared between the record set and index consumers.
//!
//! The signal carries no payload: a consumer only learns that every cached
//! particle index it holds is stale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Emitter side of the reorder signal, owned by the record set.
#[derive(Debug, Default)]
pub struct SortNotifier {
    epoch: Arc<AtomicU64>,
}

impl SortNotifier {
    /// Create a notifier that has never fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new consumer. The subscription starts up to date.
    pub fn subscribe(&self) -> SortSubscription {
        SortSubscription {
            seen: self.epoch.load(Ordering::Acquire),
            epoch: Arc::clone(&self.epoch),
        }
    }

    /// Tell every subscriber that particle indices have changed.
    pub fn notify(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of reorders signalled so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

/// Consumer side of the reorder signal.
#[derive(Debug, Clone)]
pub struct SortSubscription {
    epoch: Arc<AtomicU64>,
    seen: u64,
}

impl SortSubscription {
    /// `true` if a reorder was signalled since the last [`acknowledge`](Self::acknowledge).
    pub fn is_stale(&self) -> bool {
        self.epoch.load(Ordering::Acquire) != self.seen
    }

    /// Mark everything signalled so far as handled.
    pub fn acknowledge(&mut self) {
        self.seen = self.epoch.load(Ordering::Acquire);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_subscription_is_current() {
        let notifier = SortNotifier::new();
        let sub = notifier.subscribe();
        assert!(!sub.is_stale());
        assert_eq!(notifier.epoch(), 0);
    }

    #[test]
    fn notify_marks_all_subscribers_stale() {
        let notifier = SortNotifier::new();
        let mut a = notifier.subscribe();
        let b = notifier.subscribe();

        notifier.notify();
        assert!(a.is_stale());
        assert!(b.is_stale());

        a.acknowledge();
        assert!(!a.is_stale());
        assert!(b.is_stale());
    }

    #[test]
    fn late_subscriber_ignores_earlier_signals() {
        let notifier = SortNotifier::new();
        notifier.notify();
        notifier.notify();
        let sub = notifier.subscribe();
        assert!(!sub.is_stale());
        assert_eq!(notifier.epoch(), 2);
    }
}
