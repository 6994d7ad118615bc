// crates/sentinel-engine/src/counters.rs
// ============================================================================
// Module: Alert Counters
// Description: Windowed (1h/24h) alert counts by severity, type, and component.
// Purpose: Give operators cheap "how noisy has this been" numbers without a dedicated TSDB.
// Dependencies: sentinel_core::Severity, time
// ============================================================================

//! ## Overview
//! Grounded on the original alert generator's in-memory counters, built here
//! (per `SPEC_FULL.md`'s `[ADDED 4.4]` note) as a ring of timestamped events
//! pruned on each write rather than a decaying counter, so the reported
//! windows are exact rather than approximate.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::RwLock;

use sentinel_core::Severity;
use time::Duration;
use time::OffsetDateTime;

/// The longest window any counter tracks; entries older than this are
/// dropped from a bucket on every write so the ring never grows unbounded.
const RETENTION: Duration = Duration::hours(24);
/// The short window reported alongside the 24h one.
const SHORT_WINDOW: Duration = Duration::hours(1);

/// Windowed counts of admitted alerts, keyed three ways.
#[derive(Default)]
pub struct AlertCounters {
    /// Arrival timestamps keyed by severity.
    by_severity: RwLock<HashMap<Severity, VecDeque<OffsetDateTime>>>,
    /// Arrival timestamps keyed by `alert_type`.
    by_type: RwLock<HashMap<String, VecDeque<OffsetDateTime>>>,
    /// Arrival timestamps keyed by `component`.
    by_component: RwLock<HashMap<String, VecDeque<OffsetDateTime>>>,
}

/// Counts for one key at both reported windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    /// Count within the last hour.
    pub last_hour: u64,
    /// Count within the last 24 hours.
    pub last_day: u64,
}

impl AlertCounters {
    /// Records one alert's arrival under all three dimensions, pruning
    /// entries older than [`RETENTION`] from each touched bucket.
    pub fn record(
        &self,
        severity: Severity,
        alert_type: &str,
        component: Option<&str>,
        now: OffsetDateTime,
    ) {
        if let Ok(mut by_severity) = self.by_severity.write() {
            push_pruned(by_severity.entry(severity).or_default(), now);
        }
        if let Ok(mut by_type) = self.by_type.write() {
            push_pruned(by_type.entry(alert_type.to_string()).or_default(), now);
        }
        if let Some(component) = component {
            if let Ok(mut by_component) = self.by_component.write() {
                push_pruned(by_component.entry(component.to_string()).or_default(), now);
            }
        }
    }

    /// Reports 1h/24h counts for `severity`.
    #[must_use]
    pub fn by_severity(&self, severity: Severity, now: OffsetDateTime) -> WindowCounts {
        self.by_severity
            .read()
            .ok()
            .and_then(|map| map.get(&severity).map(|ring| windowed(ring, now)))
            .unwrap_or_default()
    }

    /// Reports 1h/24h counts for `alert_type`.
    #[must_use]
    pub fn by_type(&self, alert_type: &str, now: OffsetDateTime) -> WindowCounts {
        self.by_type
            .read()
            .ok()
            .and_then(|map| map.get(alert_type).map(|ring| windowed(ring, now)))
            .unwrap_or_default()
    }

    /// Reports 1h/24h counts for `component`.
    #[must_use]
    pub fn by_component(&self, component: &str, now: OffsetDateTime) -> WindowCounts {
        self.by_component
            .read()
            .ok()
            .and_then(|map| map.get(component).map(|ring| windowed(ring, now)))
            .unwrap_or_default()
    }
}

/// Appends `now` and drops entries older than [`RETENTION`].
fn push_pruned(ring: &mut VecDeque<OffsetDateTime>, now: OffsetDateTime) {
    ring.push_back(now);
    while let Some(&oldest) = ring.front() {
        if now - oldest > RETENTION {
            ring.pop_front();
        } else {
            break;
        }
    }
}

/// Counts entries within [`SHORT_WINDOW`] and [`RETENTION`] of `now`.
fn windowed(ring: &VecDeque<OffsetDateTime>, now: OffsetDateTime) -> WindowCounts {
    let mut counts = WindowCounts::default();
    for &timestamp in ring {
        let age = now - timestamp;
        if age <= RETENTION {
            counts.last_day += 1;
        }
        if age <= SHORT_WINDOW {
            counts.last_hour += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000 + secs)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    #[test]
    fn counts_are_split_by_window() {
        let counters = AlertCounters::default();
        counters.record(Severity::High, "rule_threshold", Some("ingest"), t(0));
        counters.record(Severity::High, "rule_threshold", Some("ingest"), t(30 * 60));
        counters.record(Severity::High, "rule_threshold", Some("ingest"), t(2 * 3600));

        let counts = counters.by_severity(Severity::High, t(2 * 3600));
        assert_eq!(counts.last_hour, 2);
        assert_eq!(counts.last_day, 3);
    }

    #[test]
    fn entries_older_than_24h_are_pruned_on_write() {
        let counters = AlertCounters::default();
        counters.record(Severity::Low, "rule_trend", None, t(0));
        counters.record(Severity::Low, "rule_trend", None, t(25 * 3600));

        let counts = counters.by_severity(Severity::Low, t(25 * 3600));
        assert_eq!(counts.last_day, 1);
    }

    #[test]
    fn component_dimension_is_skipped_when_absent() {
        let counters = AlertCounters::default();
        counters.record(Severity::Info, "rule_event", None, t(0));
        assert_eq!(counters.by_component("ingest", t(0)), WindowCounts::default());
    }
}
