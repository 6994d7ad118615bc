// crates/sentinel-rules/src/lib.rs
// ============================================================================
// Crate: sentinel-rules
// Description: Typed rule conditions, validation, and evaluation (C1).
// Purpose: Turn a registered Rule set into RuleEvaluationResults against metrics or events.
// Dependencies: predicate-logic, sentinel-core
// ============================================================================

//! ## Overview
//! `sentinel-rules` implements the six rule families (THRESHOLD, TREND,
//! ANOMALY, COMPOUND, EVENT, PATTERN) on top of `predicate-logic`'s
//! short-circuiting Boolean algebra. [`engine::RuleEngine`] is the crate's
//! entry point: register validated rules, then evaluate them against a
//! metrics snapshot or an event.

#![warn(missing_docs)]

pub mod context;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod predicate;
pub mod trend;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::EvalContext;
pub use context::Event;
pub use engine::RuleEngine;
pub use engine::RuleEngineError;
pub use engine::validate_conditions;
pub use engine::validate_rule;
pub use error::RuleValidationError;
pub use predicate::LeafCondition;
pub use predicate::build_requirement;
pub use predicate::eval_leaf;
