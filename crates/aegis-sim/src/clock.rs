//! Injectable time.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::error::SimError;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts whole periods elapsed since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    period: Duration,
    next: DateTime<Utc>,
}

impl Ticker {
    /// First tick falls due one `period` after `start`.
    pub fn new(period: Duration, start: DateTime<Utc>) -> Result<Self, SimError> {
        if period <= Duration::zero() {
            return Err(SimError::InvalidPeriod);
        }
        Ok(Self {
            period,
            next: start + period,
        })
    }

    /// One-second schedule starting at `start`.
    pub fn every_second(start: DateTime<Utc>) -> Self {
        let period = Duration::seconds(1);
        Self {
            period,
            next: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks due at `now`. Consumes them.
    ///
    /// A clock that moved backwards yields zero.
    pub fn poll(&mut self, now: DateTime<Utc>) -> u32 {
        if now < self.next {
            return 0;
        }
        let behind = (now - self.next).num_milliseconds();
        let period_ms = self.period.num_milliseconds().max(1);
        let due = (behind / period_ms + 1).min(i64::from(i32::MAX)) as i32;
        self.next += self.period * due;
        due as u32
    }

    /// Restart the schedule from `start`, dropping any pending ticks.
    pub fn restart(&mut self, start: DateTime<Utc>) {
        self.next = start + self.period;
    }
}
