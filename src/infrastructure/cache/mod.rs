pub mod cache_keys;
pub mod recent_keys;

use chrono::{DateTime, Utc};

pub use recent_keys::RecentKeys;

/// Time source for anything with expiry, injectable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
