// crates/sentinel-rules/src/predicate.rs
// ============================================================================
// Module: Leaf Predicates
// Description: The domain-specific leaves plugged into `predicate_logic::Requirement`.
// Purpose: Translate one non-COMPOUND rule condition into a short-circuit-tree leaf.
// Dependencies: predicate_logic::PredicateEval, crate::{context, metrics, trend}
// ============================================================================

//! ## Overview
//! `build_requirement` turns a `RuleConditions` tree into a
//! `predicate_logic::Requirement<LeafCondition>`: COMPOUND nodes become
//! `And`/`Or`/`Not` combinators, and every other variant becomes a
//! `LeafCondition` predicate. This is the same substrate `predicate-logic`
//! already provides for short-circuiting Boolean algebra; rules reuse it
//! rather than reimplementing AND/OR/NOT short-circuit logic.

use predicate_logic::PredicateEval;
use predicate_logic::Requirement;
use serde_json::Value;

use sentinel_core::ComparisonOperator;
use sentinel_core::CompoundOperator;
use sentinel_core::MatchType;
use sentinel_core::RuleConditions;

use crate::context::EvalContext;
use crate::metrics::resolve_path;
use crate::metrics::resolve_series;
use crate::trend;

/// One non-COMPOUND condition, cloned out of its owning [`sentinel_core::Rule`]
/// so it can sit at a leaf of a `Requirement<LeafCondition>` tree.
#[derive(Debug, Clone)]
pub struct LeafCondition(RuleConditions);

impl PredicateEval for LeafCondition {
    type Context = EvalContext;

    fn eval(&self, ctx: &Self::Context) -> bool {
        eval_leaf(&self.0, ctx)
    }
}

/// Builds a short-circuiting requirement tree from a rule's condition
/// payload. COMPOUND nodes recurse; every other variant becomes a leaf.
///
/// # Panics
///
/// Never panics; a malformed `NOT` (not exactly one child) is handled by
/// `validate_conditions` before a rule ever reaches evaluation, so this
/// function trusts its input and treats a missing child as trivially
/// unsatisfied rather than crashing.
#[must_use]
pub fn build_requirement(conditions: &RuleConditions) -> Requirement<LeafCondition> {
    match conditions {
        RuleConditions::Compound {
            operator,
            conditions,
        } => {
            let children: Vec<_> = conditions.iter().map(build_requirement).collect();
            match operator {
                CompoundOperator::And => Requirement::and(children),
                CompoundOperator::Or => Requirement::or(children),
                CompoundOperator::Not => match children.into_iter().next() {
                    Some(only) => Requirement::negate(only),
                    None => Requirement::and(Vec::new()),
                },
            }
        }
        leaf => Requirement::predicate(LeafCondition(leaf.clone())),
    }
}

/// Evaluates one non-COMPOUND condition against `ctx`. Called both directly
/// (THRESHOLD/TREND/ANOMALY/EVENT/PATTERN as the rule's top-level condition)
/// and as a `Requirement` leaf beneath a COMPOUND ancestor.
#[must_use]
pub fn eval_leaf(condition: &RuleConditions, ctx: &EvalContext) -> bool {
    match condition {
        RuleConditions::Threshold {
            metric_path,
            operator,
            value,
        } => ctx
            .metrics
            .as_ref()
            .and_then(|metrics| resolve_path(metrics, metric_path))
            .is_some_and(|actual| compare(actual, *operator, value)),
        RuleConditions::Trend {
            metric_path,
            window,
            trend_type,
            threshold,
            direction,
        } => {
            let Some(metrics) = ctx.metrics.as_ref() else { return false };
            let Some(current) = resolve_series(metrics, metric_path) else { return false };
            let series = ctx.windowed_series(metric_path, current, *window);
            if series.len() < 2 {
                return false;
            }
            let magnitude = trend::magnitude(&series, *trend_type);
            trend::satisfies_direction(magnitude, *threshold, *direction)
        }
        RuleConditions::Anomaly {
            metric_path,
            sensitivity,
            algorithm,
            min_data_points,
        } => {
            let Some(metrics) = ctx.metrics.as_ref() else { return false };
            let Some(current) = resolve_series(metrics, metric_path) else { return false };
            let series = ctx.windowed_series(metric_path, current, usize::MAX);
            if series.len() < *min_data_points {
                return false;
            }
            ctx.anomaly_detector.detect_anomaly(&series, algorithm, *sensitivity, metric_path)
        }
        RuleConditions::Compound {
            ..
        } => build_requirement(condition).eval(ctx),
        RuleConditions::Event {
            event_type,
            event_source,
            properties,
        } => {
            let Some(event) = ctx.event.as_ref() else { return false };
            if &event.event_type != event_type {
                return false;
            }
            if let Some(expected_source) = event_source
                && event.event_source.as_deref() != Some(expected_source.as_str())
            {
                return false;
            }
            properties.iter().all(|property| {
                resolve_path(&event.properties, &property.field)
                    .is_some_and(|actual| compare(actual, property.operator, &property.value))
            })
        }
        RuleConditions::Pattern {
            pattern,
            field,
            match_type,
        } => {
            let Some(event) = ctx.event.as_ref() else { return false };
            let Some(target) = resolve_path(&event.properties, field) else { return false };
            let target = stringify(target);
            match match_type {
                MatchType::Regex => regex::Regex::new(pattern).is_ok_and(|re| re.is_match(&target)),
                MatchType::Contains => target.contains(pattern.as_str()),
                MatchType::StartsWith => target.starts_with(pattern.as_str()),
                MatchType::EndsWith => target.ends_with(pattern.as_str()),
            }
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn compare(actual: &Value, operator: ComparisonOperator, expected: &Value) -> bool {
    match operator {
        ComparisonOperator::Eq => actual == expected,
        ComparisonOperator::Ne => actual != expected,
        ComparisonOperator::Gt
        | ComparisonOperator::Ge
        | ComparisonOperator::Lt
        | ComparisonOperator::Le => {
            let (Some(actual), Some(expected)) = (actual.as_f64(), expected.as_f64()) else {
                return false;
            };
            match operator {
                ComparisonOperator::Gt => actual > expected,
                ComparisonOperator::Ge => actual >= expected,
                ComparisonOperator::Lt => actual < expected,
                ComparisonOperator::Le => actual <= expected,
                ComparisonOperator::Eq | ComparisonOperator::Ne => unreachable!("handled above"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use sentinel_core::ComparisonOperator;
    use sentinel_core::RuleConditions;

    use super::*;
    use crate::test_support::NeverAnomalyDetector;
    use crate::test_support::empty_metric_context;

    #[test]
    fn threshold_missing_path_does_not_trigger() {
        let ctx = empty_metric_context(json!({"cpu": {}}), NeverAnomalyDetector);
        let condition = RuleConditions::Threshold {
            metric_path: "cpu.utilization".to_string(),
            operator: ComparisonOperator::Gt,
            value: json!(80),
        };
        assert!(!eval_leaf(&condition, &ctx));
    }

    #[test]
    fn threshold_compares_numerically() {
        let ctx = empty_metric_context(json!({"cpu": {"utilization": 92}}), NeverAnomalyDetector);
        let condition = RuleConditions::Threshold {
            metric_path: "cpu.utilization".to_string(),
            operator: ComparisonOperator::Gt,
            value: json!(80),
        };
        assert!(eval_leaf(&condition, &ctx));
    }
}
