//! # Clock Port
//!
//! Time is read through `TimeSource` so tests can pin it.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Wall-clock instant, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Settable time source for tests.
#[derive(Debug)]
pub struct MockTimeSource {
    time: Mutex<Timestamp>,
}

impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: Mutex::new(initial),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut time = self.time.lock();
        *time += by;
    }

    pub fn set(&self, time: Timestamp) {
        *self.time.lock() = time;
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        *self.time.lock()
    }
}
