use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;

use super::Clock;

/// Keys seen within a sliding window, for dropping redelivered messages.
///
/// Owned by whoever consumes the messages; there is no process-wide instance.
pub struct RecentKeys<C: Clock> {
    clock: C,
    window: Duration,
    seen: HashMap<String, DateTime<Utc>>,
}

impl<C: Clock> RecentKeys<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        RecentKeys {
            clock,
            window,
            seen: HashMap::new(),
        }
    }

    /// Records `key` and returns true if it was not seen within the window.
    pub fn observe(&mut self, key: &str) -> bool {
        let now = self.clock.now();
        if let Some(last_seen) = self.seen.get(key) {
            if now - *last_seen < self.window {
                debug!("Duplicate key {} within window", key);
                return false;
            }
        }
        self.seen.insert(key.to_string(), now);
        true
    }

    /// Forgets `key` so its next delivery is treated as new.
    pub fn forget(&mut self, key: &str) -> bool {
        self.seen.remove(key).is_some()
    }

    /// Drops keys older than the window; returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.seen.len();
        let window = self.window;
        self.seen.retain(|_, last_seen| now - *last_seen < window);
        before - self.seen.len()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
