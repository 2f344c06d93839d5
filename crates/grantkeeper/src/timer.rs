//! Keyed TTL timers.
//!
//! Each key has at most one deadline. Re-arming a key replaces its deadline
//! rather than adding a second timer. Deadlines are checked by a periodic
//! sweep, so a key fires somewhere between its deadline and one sweep
//! interval later.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Why an expiry callback was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireReason {
    /// The deadline passed.
    Expired,
    /// The timer was cancelled before its deadline.
    Manual,
}

/// Invoked with the key and reason whenever a timer ends.
pub type ExpireCallback = Arc<dyn Fn(&str, ExpireReason) + Send + Sync>;

/// A set of per-key expiry timers with a single callback.
pub trait ExpiryTimer: Send + Sync {
    /// Start, or restart, the timer for `key`.
    fn arm(&self, key: &str);

    /// Stop the timer for `key`, reporting [`ExpireReason::Manual`] if one
    /// was running. Idempotent.
    fn cancel(&self, key: &str);

    fn set_expire_callback(&self, callback: ExpireCallback);
}

/// [`ExpiryTimer`] backed by a deadline map and a periodic sweep.
pub struct KeyedTimerSet {
    ttl: Duration,
    sweep_interval: Duration,
    deadlines: Mutex<HashMap<String, Instant>>,
    callback: RwLock<Option<ExpireCallback>>,
}

impl KeyedTimerSet {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            ttl,
            sweep_interval,
            deadlines: Mutex::new(HashMap::new()),
            callback: RwLock::new(None),
        }
    }

    /// Arm `key` with a TTL other than the default.
    pub fn arm_for(&self, key: &str, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.deadlines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), deadline);
    }

    pub fn is_armed(&self, key: &str) -> bool {
        self.deadlines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of armed keys.
    pub fn len(&self) -> usize {
        self.deadlines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fire every timer whose deadline has passed. Returns how many fired.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let due: Vec<String> = {
            let mut deadlines = self.deadlines.lock().unwrap_or_else(PoisonError::into_inner);
            let due: Vec<String> = deadlines
                .iter()
                .filter(|(_, deadline)| **deadline <= now)
                .map(|(key, _)| key.clone())
                .collect();
            for key in &due {
                deadlines.remove(key);
            }
            due
        };

        // Callbacks run without the deadline lock so they may re-arm.
        for key in &due {
            self.fire(key, ExpireReason::Expired);
        }
        if !due.is_empty() {
            tracing::debug!(count = due.len(), "expired timers swept");
        }
        due.len()
    }

    /// Run [`sweep`](Self::sweep) every sweep interval on a new task.
    ///
    /// The task holds only a weak reference and exits once the set is
    /// dropped. Must be called from within a Tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let timers = Arc::downgrade(self);
        let period = self.sweep_interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(timers) = timers.upgrade() else {
                    break;
                };
                timers.sweep();
            }
            tracing::debug!("timer sweeper stopped");
        })
    }

    fn fire(&self, key: &str, reason: ExpireReason) {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(key, reason);
        }
    }
}

impl ExpiryTimer for KeyedTimerSet {
    fn arm(&self, key: &str) {
        self.arm_for(key, self.ttl);
    }

    fn cancel(&self, key: &str) {
        let removed = self
            .deadlines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        if removed {
            self.fire(key, ExpireReason::Manual);
        }
    }

    fn set_expire_callback(&self, callback: ExpireCallback) {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Events = Arc<Mutex<Vec<(String, ExpireReason)>>>;

    fn recording(timers: &KeyedTimerSet) -> Events {
        let events: Events = Arc::default();
        let sink = events.clone();
        timers.set_expire_callback(Arc::new(move |key: &str, reason: ExpireReason| {
            sink.lock().unwrap().push((key.to_string(), reason));
        }));
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_fires_due_keys() {
        let timers = KeyedTimerSet::new(Duration::from_secs(10), Duration::from_secs(1));
        let events = recording(&timers);

        timers.arm("a");
        timers.arm_for("b", Duration::from_secs(30));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(timers.sweep(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec![("a".to_string(), ExpireReason::Expired)]
        );
        assert!(!timers.is_armed("a"));
        assert!(timers.is_armed("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_deadline() {
        let timers = KeyedTimerSet::new(Duration::from_secs(10), Duration::from_secs(1));
        let events = recording(&timers);

        timers.arm("a");
        tokio::time::advance(Duration::from_secs(8)).await;
        timers.arm("a");
        assert_eq!(timers.len(), 1);

        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(timers.sweep(), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(timers.sweep(), 1);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_reports_manual_once() {
        let timers = KeyedTimerSet::new(Duration::from_secs(10), Duration::from_secs(1));
        let events = recording(&timers);

        timers.cancel("never-armed");
        assert!(events.lock().unwrap().is_empty());

        timers.arm("a");
        timers.cancel("a");
        timers.cancel("a");
        assert_eq!(
            *events.lock().unwrap(),
            vec![("a".to_string(), ExpireReason::Manual)]
        );
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_may_rearm() {
        let timers = Arc::new(KeyedTimerSet::new(
            Duration::from_secs(5),
            Duration::from_secs(1),
        ));
        let weak = Arc::downgrade(&timers);
        timers.set_expire_callback(Arc::new(move |key: &str, reason: ExpireReason| {
            if reason == ExpireReason::Expired && key == "loop" {
                if let Some(timers) = weak.upgrade() {
                    timers.arm("again");
                }
            }
        }));

        timers.arm("loop");
        tokio::time::advance(Duration::from_secs(5)).await;
        timers.sweep();
        assert!(timers.is_armed("again"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task() {
        let timers = Arc::new(KeyedTimerSet::new(
            Duration::from_secs(10),
            Duration::from_secs(5),
        ));
        let events = recording(&timers);
        let sweeper = timers.spawn_sweeper();

        timers.arm("a");
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(events.lock().unwrap().len(), 1);

        drop(timers);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(sweeper.is_finished());
    }
}
