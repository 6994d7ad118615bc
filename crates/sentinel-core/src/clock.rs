// crates/sentinel-core/src/clock.rs
// ============================================================================
// Module: Injectable Clock
// Description: Time source abstraction used by every stateful component.
// Purpose: Keep timestamp-bearing operations deterministic and replayable in tests.
// Dependencies: time
// ============================================================================

//! ## Overview
//! No component reads wall-clock time directly. Every constructor that needs
//! `now` takes an `Arc<dyn Clock>` instead, so tests can swap in a fixed or
//! stepped clock and assert on exact timestamps (escalation boundaries,
//! approval TTL expiry, and so on all depend on this).

use time::OffsetDateTime;

/// Supplies the current time to a component.
///
/// Production code uses `sentinel_providers::SystemClock`; tests use a fixed
/// or stepped clock so escalation-boundary and approval-TTL assertions can
/// compare against exact timestamps instead of racing the wall clock.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> OffsetDateTime;
}
