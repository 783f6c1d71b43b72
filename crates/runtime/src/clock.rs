//! Wall-clock access for the accrual side of the runtime.
//!
//! `game-core` never reads time itself; the runtime asks a [`Clock`] and
//! passes the result in as `now`.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use game_core::Timestamp;
use game_core::time::millis_from_hours;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads `chrono::Utc::now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(chrono::Utc::now().timestamp_millis())
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.0)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.0, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, ms: i64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_hours(&self, hours: f64) {
        self.advance_millis(millis_from_hours(hours));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.millis.load(Ordering::SeqCst))
    }
}
