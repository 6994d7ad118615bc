// crates/sentinel-providers/src/clock.rs
// ============================================================================
// Module: Clock Implementations
// Description: Production and test-oriented implementations of sentinel_core::Clock.
// Purpose: Supply wall-clock time in production and deterministic, advanceable time in tests.
// Dependencies: sentinel_core::Clock, time, std::sync::RwLock
// ============================================================================

//! ## Overview
//! [`SystemClock`] is the production `Clock` every composition root wires in.
//! [`FixedClock`] and [`SteppedClock`] exist so integration tests elsewhere in
//! the workspace (escalation boundaries, approval TTL expiry, correlation
//! windows) can assert against exact timestamps instead of racing the wall
//! clock, the same need each crate's own unit tests solve locally with a
//! private fixed clock.

use std::sync::RwLock;

use sentinel_core::Clock;
use time::OffsetDateTime;

/// Reads the current time from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Returns an instant that advances only when [`SteppedClock::advance`] is
/// called, for tests that need several distinct "ticks" without depending
/// on real elapsed wall-clock time.
#[derive(Debug)]
pub struct SteppedClock(RwLock<OffsetDateTime>);

impl SteppedClock {
    /// Starts the clock at `initial`.
    #[must_use]
    pub fn new(initial: OffsetDateTime) -> Self {
        Self(RwLock::new(initial))
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: time::Duration) {
        let Ok(mut guard) = self.0.write() else { return };
        *guard += delta;
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> OffsetDateTime {
        self.0.read().map_or(OffsetDateTime::UNIX_EPOCH, |guard| *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let clock = FixedClock(now);
        assert_eq!(clock.now(), now);
        assert_eq!(clock.now(), now);
    }

    #[test]
    fn stepped_clock_advances_by_delta() {
        let clock = SteppedClock::new(OffsetDateTime::UNIX_EPOCH);
        clock.advance(time::Duration::minutes(15));
        assert_eq!(clock.now(), OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(15));
    }
}
