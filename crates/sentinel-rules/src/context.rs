// crates/sentinel-rules/src/context.rs
// ============================================================================
// Module: Evaluation Context
// Description: The data an evaluation pass hands to every leaf predicate.
// Purpose: Carry metrics, an optional event, the anomaly detector, and historical series together.
// Dependencies: sentinel_core::AnomalyDetector, serde_json
// ============================================================================

//! ## Overview
//! One `EvalContext` is built per `evaluate_metrics`/`evaluate_events` call
//! and shared read-only across every rule in the batch. It owns its data
//! (rather than borrowing) so it can serve as `predicate_logic::PredicateEval`'s
//! associated `Context` type, which — like the rest of `predicate-logic` — has
//! no lifetime parameter of its own; the detector is held by `Arc` so cloning
//! the context per call stays cheap.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use sentinel_core::AnomalyDetector;

/// An event fed to `evaluate_events`: a type tag, optional source, and a
/// free-form properties mapping.
#[derive(Debug, Clone)]
pub struct Event {
    /// The event's type tag, matched against `RuleConditions::Event::event_type`.
    pub event_type: String,
    /// The event's originating subsystem, if any.
    pub event_source: Option<String>,
    /// Free-form event payload, addressed by dot-path for `PropertyCondition`
    /// and `PATTERN` rules.
    pub properties: Value,
}

/// Context shared by every leaf predicate evaluated in one pass.
#[derive(Clone)]
pub struct EvalContext {
    /// The metrics mapping for THRESHOLD/TREND/ANOMALY/COMPOUND rules, or
    /// `None` when evaluating events.
    pub metrics: Option<Value>,
    /// The event for EVENT/PATTERN rules, or `None` when evaluating metrics.
    pub event: Option<Event>,
    /// Detector consulted by ANOMALY rules.
    pub anomaly_detector: Arc<dyn AnomalyDetector>,
    /// Prior series points per metric path, prepended to the current value
    /// before TREND/ANOMALY evaluation so a window can span calls.
    pub historical_series: Arc<HashMap<String, Vec<f64>>>,
}

impl EvalContext {
    /// Builds a context for a metrics evaluation pass.
    #[must_use]
    pub fn for_metrics(
        metrics: Value,
        anomaly_detector: Arc<dyn AnomalyDetector>,
        historical_series: Arc<HashMap<String, Vec<f64>>>,
    ) -> Self {
        Self {
            metrics: Some(metrics),
            event: None,
            anomaly_detector,
            historical_series,
        }
    }

    /// Builds a context for an event evaluation pass.
    #[must_use]
    pub fn for_event(event: Event, anomaly_detector: Arc<dyn AnomalyDetector>) -> Self {
        Self {
            metrics: None,
            event: Some(event),
            anomaly_detector,
            historical_series: Arc::new(HashMap::new()),
        }
    }

    /// Merges `historical_series[metric_path]` (older points first) with the
    /// series currently resolved at `metric_path`, then keeps only the last
    /// `window` points if the combined series is longer than `window`.
    #[must_use]
    pub fn windowed_series(&self, metric_path: &str, current: Vec<f64>, window: usize) -> Vec<f64> {
        let mut combined = self.historical_series.get(metric_path).cloned().unwrap_or_default();
        combined.extend(current);
        if combined.len() > window {
            let skip = combined.len() - window;
            combined.drain(..skip);
        }
        combined
    }
}
