//! Wall-clock sources injected into the ledger and publisher.
//!
//! Assertion timestamps are the only ordering signal on the bus, so every
//! component that stamps or ages a record reads time through [`Clock`].

use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// A source of wall-clock time.
pub trait Clock: Send + Sync + std::fmt::Debug + 'static {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall time derived from the tokio monotonic clock.
///
/// Anchored at construction; afterwards it advances with `tokio::time`, so
/// it follows paused and auto-advanced time in tests and never jumps
/// backwards when the system clock is adjusted.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    anchor_wall: DateTime<Utc>,
    anchor_instant: tokio::time::Instant,
}

impl TokioClock {
    /// Anchor at the current system time.
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Anchor at a fixed wall time.
    pub fn anchored_at(anchor_wall: DateTime<Utc>) -> Self {
        Self {
            anchor_wall,
            anchor_instant: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.anchor_instant.elapsed();
        let elapsed = chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero());
        self.anchor_wall + elapsed
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at the given time.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
