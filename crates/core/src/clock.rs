// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! Timestamps on domain entities are epoch milliseconds (`u64`); `now()`
//! exists for elapsed-time measurement (probe response times).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time.
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Fake clock for testing with controllable time.
///
/// `now()` reports the construction instant plus everything advanced so far,
/// so elapsed-time math stays consistent with `epoch_ms()`.
#[derive(Clone)]
pub struct FakeClock {
    base: Instant,
    offset_ms: Arc<AtomicU64>,
    epoch_base_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::at_epoch_ms(1_000_000)
    }

    /// A fake clock whose epoch starts at the given millisecond timestamp.
    pub fn at_epoch_ms(epoch_ms: u64) -> Self {
        Self {
            base: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
            epoch_base_ms: epoch_ms,
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        self.offset_ms.fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_base_ms + self.offset_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
