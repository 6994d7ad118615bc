// crates/sentinel-rules/src/test_support.rs
// ============================================================================
// Module: Test Support
// Description: Shared test doubles for predicate/engine unit tests.
// Purpose: Avoid duplicating a trivial AnomalyDetector stub across test modules.
// Dependencies: sentinel_core::AnomalyDetector
// ============================================================================

//! ## Overview
//! `#[cfg(test)]`-only helpers shared by `predicate.rs` and `engine.rs`'s test
//! modules. Not part of the crate's public surface.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use sentinel_core::AnomalyDetector;

use crate::context::EvalContext;

/// An [`AnomalyDetector`] that never reports an anomaly, for tests that
/// exercise THRESHOLD/TREND/EVENT/PATTERN paths and don't care about ANOMALY.
#[derive(Debug, Clone, Copy)]
pub struct NeverAnomalyDetector;

impl AnomalyDetector for NeverAnomalyDetector {
    fn detect_anomaly(
        &self,
        _series: &[f64],
        _algorithm: &str,
        _sensitivity: f64,
        _metric_name: &str,
    ) -> bool {
        false
    }
}

/// An [`AnomalyDetector`] that reports every call as an anomaly, for tests
/// that need ANOMALY rules to trigger deterministically.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysAnomalyDetector;

impl AnomalyDetector for AlwaysAnomalyDetector {
    fn detect_anomaly(
        &self,
        _series: &[f64],
        _algorithm: &str,
        _sensitivity: f64,
        _metric_name: &str,
    ) -> bool {
        true
    }
}

/// Builds a metrics [`EvalContext`] with no historical series, for tests
/// that only need a single snapshot.
#[must_use]
pub fn empty_metric_context(
    metrics: Value,
    detector: impl AnomalyDetector + 'static,
) -> EvalContext {
    EvalContext::for_metrics(metrics, Arc::new(detector), Arc::new(HashMap::new()))
}
