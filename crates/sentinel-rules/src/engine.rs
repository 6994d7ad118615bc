// crates/sentinel-rules/src/engine.rs
// ============================================================================
// Module: Rule Engine
// Description: Holds the rule set and evaluates it against metrics or events.
// Purpose: Implement C1 — typed rule evaluation with per-rule exception containment.
// Dependencies: crate::{context, error, predicate}, sentinel_core, predicate_logic
// ============================================================================

//! ## Overview
//! `RuleEngine` owns a validated rule set behind a `RwLock` (rule mutation is
//! rare; evaluation is frequent and must be safe for concurrent callers, per
//! the concurrency model's "safe for concurrent invocation provided
//! mutations are serialized"). Evaluation never panics: any would-be panic
//! path (bad regex, missing series) is turned into `triggered=false` with
//! `details.status="error"` before it leaves the engine.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;
use std::sync::RwLock;

use predicate_logic::NoopTrace;
use predicate_logic::RequirementTrace;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

use sentinel_core::AnomalyDetector;
use sentinel_core::Clock;
use sentinel_core::Context as RecordContext;
use sentinel_core::Rule;
use sentinel_core::RuleConditions;
use sentinel_core::RuleEvaluationResult;
use sentinel_core::RuleId;
use sentinel_core::RuleType;

use crate::context::Event;
use crate::context::EvalContext;
use crate::error::RuleValidationError;
use crate::predicate::build_requirement;
use crate::predicate::eval_leaf;

/// Validates one rule's condition payload.
///
/// # Errors
///
/// Returns the specific [`RuleValidationError`] variant for the first
/// structural defect found.
pub fn validate_conditions(conditions: &RuleConditions) -> Result<(), RuleValidationError> {
    match conditions {
        RuleConditions::Threshold {
            metric_path, ..
        } => {
            if metric_path.is_empty() {
                return Err(RuleValidationError::EmptyMetricPath);
            }
        }
        RuleConditions::Trend {
            metric_path,
            window,
            threshold,
            ..
        } => {
            if metric_path.is_empty() {
                return Err(RuleValidationError::EmptyMetricPath);
            }
            if *window == 0 {
                return Err(RuleValidationError::ZeroWindow);
            }
            if !threshold.is_finite() {
                return Err(RuleValidationError::NonFiniteThreshold);
            }
        }
        RuleConditions::Anomaly {
            metric_path,
            sensitivity,
            min_data_points,
            ..
        } => {
            if metric_path.is_empty() {
                return Err(RuleValidationError::EmptyMetricPath);
            }
            if *sensitivity <= 0.0 {
                return Err(RuleValidationError::NonPositiveSensitivity);
            }
            if *min_data_points == 0 {
                return Err(RuleValidationError::ZeroMinDataPoints);
            }
        }
        RuleConditions::Compound {
            operator,
            conditions,
        } => {
            if conditions.is_empty() {
                return Err(RuleValidationError::EmptyCompoundConditions);
            }
            if matches!(operator, sentinel_core::CompoundOperator::Not) && conditions.len() != 1 {
                return Err(RuleValidationError::NotRequiresExactlyOneCondition(conditions.len()));
            }
            for child in conditions {
                validate_conditions(child)?;
            }
        }
        RuleConditions::Event {
            event_type,
            properties,
            ..
        } => {
            if event_type.is_empty() {
                return Err(RuleValidationError::EmptyEventType);
            }
            for property in properties {
                if property.field.is_empty() {
                    return Err(RuleValidationError::EmptyPropertyField);
                }
            }
        }
        RuleConditions::Pattern {
            pattern,
            field,
            ..
        } => {
            if pattern.is_empty() {
                return Err(RuleValidationError::EmptyPattern);
            }
            if field.is_empty() {
                return Err(RuleValidationError::EmptyPatternField);
            }
        }
    }
    Ok(())
}

/// Validates a whole [`Rule`] (name plus condition payload).
///
/// # Errors
///
/// Returns the specific [`RuleValidationError`] variant for the first
/// structural defect found.
pub fn validate_rule(rule: &Rule) -> Result<(), RuleValidationError> {
    if rule.name.is_empty() {
        return Err(RuleValidationError::EmptyName);
    }
    validate_conditions(&rule.conditions)
}

/// Errors returned by [`RuleEngine`] rule-set mutation methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleEngineError {
    /// The rule did not pass [`validate_rule`].
    #[error("rule {rule_id} failed validation: {source}")]
    Invalid {
        /// The rule that failed validation.
        rule_id: RuleId,
        /// The specific defect.
        source: RuleValidationError,
    },
    /// No rule with the given ID is registered.
    #[error("no rule registered with id {0}")]
    NotFound(RuleId),
    /// The rule set lock was poisoned by a prior panicking holder.
    #[error("rule engine lock was poisoned")]
    Poisoned,
}

/// Evaluates the registered rule set against metrics or events.
///
/// Holds rules behind a `RwLock`: evaluation takes a read lock (concurrent
/// evaluation is safe), mutation takes a write lock (serialized, as the
/// concurrency model requires).
pub struct RuleEngine {
    rules: RwLock<HashMap<RuleId, Rule>>,
    anomaly_detector: Arc<dyn AnomalyDetector>,
    clock: Arc<dyn Clock>,
}

impl RuleEngine {
    /// Creates an engine with no rules registered.
    #[must_use]
    pub fn new(anomaly_detector: Arc<dyn AnomalyDetector>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
            anomaly_detector,
            clock,
        }
    }

    /// Validates and inserts (or replaces) a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleEngineError::Invalid`] if the rule fails validation, or
    /// [`RuleEngineError::Poisoned`] if the rule set lock was poisoned by a
    /// prior panicking holder.
    pub fn upsert_rule(&self, rule: Rule) -> Result<(), RuleEngineError> {
        validate_rule(&rule).map_err(|source| RuleEngineError::Invalid {
            rule_id: rule.rule_id.clone(),
            source,
        })?;
        let Ok(mut rules) = self.rules.write() else { return Err(RuleEngineError::Poisoned) };
        rules.insert(rule.rule_id.clone(), rule);
        Ok(())
    }

    /// Removes a rule by ID.
    ///
    /// # Errors
    ///
    /// Returns [`RuleEngineError::NotFound`] if no such rule is registered,
    /// or [`RuleEngineError::Poisoned`] if the rule set lock was poisoned.
    pub fn remove_rule(&self, rule_id: &RuleId) -> Result<(), RuleEngineError> {
        let Ok(mut rules) = self.rules.write() else { return Err(RuleEngineError::Poisoned) };
        rules.remove(rule_id).map(|_| ()).ok_or_else(|| RuleEngineError::NotFound(rule_id.clone()))
    }

    /// Returns the rule IDs belonging to `group`, per `Rule::group`. Returns
    /// an empty list if the rule set lock was poisoned.
    #[must_use]
    pub fn rule_ids_in_group(&self, group: &str) -> Vec<RuleId> {
        let Ok(rules) = self.rules.read() else { return Vec::new() };
        rules
            .values()
            .filter(|rule| rule.group() == Some(group))
            .map(|rule| rule.rule_id.clone())
            .collect()
    }

    /// Evaluates every enabled THRESHOLD/TREND/ANOMALY/COMPOUND rule against
    /// `metrics`, optionally restricted to `only` rule IDs. Returns an empty
    /// list if the rule set lock was poisoned, per this engine's
    /// never-panics contract.
    #[must_use]
    pub fn evaluate_metrics(
        &self,
        metrics: &Value,
        context: &RecordContext,
        historical_series: &HashMap<String, Vec<f64>>,
        only: Option<&[RuleId]>,
    ) -> Vec<RuleEvaluationResult> {
        let eval_ctx = EvalContext::for_metrics(
            metrics.clone(),
            Arc::clone(&self.anomaly_detector),
            Arc::new(historical_series.clone()),
        );
        self.evaluate_family(RuleType::is_metric_family, &eval_ctx, context, only, &mut NoopTrace)
    }

    /// Evaluates every enabled EVENT/PATTERN rule against `event`. Returns
    /// an empty list if the rule set lock was poisoned.
    #[must_use]
    pub fn evaluate_events(
        &self,
        event: &Event,
        context: &RecordContext,
        only: Option<&[RuleId]>,
    ) -> Vec<RuleEvaluationResult> {
        let eval_ctx = EvalContext::for_event(event.clone(), Arc::clone(&self.anomaly_detector));
        self.evaluate_family(
            |rule_type| !rule_type.is_metric_family(),
            &eval_ctx,
            context,
            only,
            &mut NoopTrace,
        )
    }

    /// Evaluates `metrics` exactly as [`Self::evaluate_metrics`] does, but
    /// records every leaf predicate visited per COMPOUND rule in `trace`,
    /// keyed by `rule_id`. Used to make short-circuit behavior testable
    /// (S4). Returns `None` if the rule set lock was poisoned.
    pub fn evaluate_metrics_with_trace<T>(
        &self,
        metrics: &Value,
        context: &RecordContext,
        historical_series: &HashMap<String, Vec<f64>>,
        rule_id: &RuleId,
        trace: &mut T,
    ) -> Option<RuleEvaluationResult>
    where
        T: RequirementTrace<crate::predicate::LeafCondition>,
    {
        let rules = self.rules.read().ok()?;
        let rule = rules.get(rule_id)?;
        let eval_ctx = EvalContext::for_metrics(
            metrics.clone(),
            Arc::clone(&self.anomaly_detector),
            Arc::new(historical_series.clone()),
        );
        Some(self.evaluate_one_with_trace(rule, &eval_ctx, context, trace))
    }

    fn evaluate_family<F, T>(
        &self,
        belongs: F,
        eval_ctx: &EvalContext,
        context: &RecordContext,
        only: Option<&[RuleId]>,
        trace: &mut T,
    ) -> Vec<RuleEvaluationResult>
    where
        F: Fn(RuleType) -> bool,
        T: RequirementTrace<crate::predicate::LeafCondition>,
    {
        let Ok(rules) = self.rules.read() else { return Vec::new() };
        rules
            .values()
            .filter(|rule| rule.enabled)
            .filter(|rule| belongs(rule.rule_type()))
            .filter(|rule| only.is_none_or(|ids| ids.contains(&rule.rule_id)))
            .map(|rule| self.evaluate_one_with_trace(rule, eval_ctx, context, trace))
            .collect()
    }

    fn evaluate_one_with_trace<T>(
        &self,
        rule: &Rule,
        eval_ctx: &EvalContext,
        caller_context: &RecordContext,
        trace: &mut T,
    ) -> RuleEvaluationResult
    where
        T: RequirementTrace<crate::predicate::LeafCondition>,
    {
        let now = self.clock.now();
        let outcome = catch_unwind(AssertUnwindSafe(|| match &rule.conditions {
            RuleConditions::Compound {
                ..
            } => build_requirement(&rule.conditions).eval_with_trace(eval_ctx, trace),
            other => eval_leaf(other, eval_ctx),
        }));

        let mut merged_context = rule.metadata.clone();
        merged_context.extend(caller_context.clone());

        match outcome {
            Ok(triggered) => RuleEvaluationResult {
                rule_id: rule.rule_id.clone(),
                rule_name: rule.name.clone(),
                rule_type: rule.rule_type(),
                triggered,
                severity: rule.severity,
                details: RecordContext::new(),
                context: merged_context,
                evaluation_time: now,
            },
            Err(_) => error_result(rule, merged_context, now),
        }
    }
}

fn error_result(rule: &Rule, context: RecordContext, now: OffsetDateTime) -> RuleEvaluationResult {
    let mut details = RecordContext::new();
    details.insert("status".to_string(), json!("error"));
    details.insert("message".to_string(), json!("rule evaluation panicked"));
    RuleEvaluationResult {
        rule_id: rule.rule_id.clone(),
        rule_name: rule.name.clone(),
        rule_type: rule.rule_type(),
        triggered: false,
        severity: rule.severity,
        details,
        context,
        evaluation_time: now,
    }
}
