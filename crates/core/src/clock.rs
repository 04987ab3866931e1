// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction: monotonic instants plus UTC wall-clock millis.
//!
//! Every timestamp-dependent decision in the engine (heartbeat freshness,
//! lease expiry, stale-runner detection, stuck-task ages) goes through this
//! trait so tests can advance time deterministically instead of sleeping.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic clock plus UTC wall clock.
pub trait Clock: Clone + Send + Sync + 'static {
    /// A monotonic instant, for measuring durations and timer deadlines.
    fn now(&self) -> Instant;
    /// UTC wall clock as milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;
}

/// Production clock backed by the OS.
#[derive(Clone, Copy, Debug, Default)]
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

/// Settable clock for deterministic tests.
///
/// `now()` always returns the fixed `base` instant offset by the elapsed
/// `epoch_ms` advanced since construction, so durations computed from two
/// `now()` calls behave consistently with `epoch_ms()` deltas.
#[derive(Clone)]
pub struct FakeClock {
    base: Instant,
    epoch_ms: Arc<Mutex<u64>>,
}

impl FakeClock {
    /// Create a fake clock starting at the given epoch milliseconds.
    pub fn new(start_epoch_ms: u64) -> Self {
        Self {
            base: Instant::now(),
            epoch_ms: Arc::new(Mutex::new(start_epoch_ms)),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        *self.epoch_ms.lock() += ms;
    }

    /// Set the clock to an absolute epoch-millis value.
    pub fn set_epoch_ms(&self, ms: u64) {
        *self.epoch_ms.lock() = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        let elapsed_ms = *self.epoch_ms.lock();
        self.base + std::time::Duration::from_millis(elapsed_ms)
    }

    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
