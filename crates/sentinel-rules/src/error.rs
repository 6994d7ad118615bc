// crates/sentinel-rules/src/error.rs
// ============================================================================
// Module: Rule Validation Errors
// Description: One variant per concrete rule-configuration defect.
// Purpose: Reject malformed rules at registration time with an actionable cause.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! Mirrors `predicate-logic`'s `RequirementGroupError`/`RequirementIdError`
//! style: a small enum of concrete failures rather than a single string
//! error, so callers can match on the specific defect.

/// A rule failed validation and was rejected before insertion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleValidationError {
    /// `name` was empty.
    #[error("rule name must not be empty")]
    EmptyName,
    /// A THRESHOLD/TREND/ANOMALY condition's `metric_path` was empty.
    #[error("metric_path must not be empty")]
    EmptyMetricPath,
    /// A TREND condition's `window` was zero.
    #[error("trend window must be at least 1")]
    ZeroWindow,
    /// A TREND condition's `threshold` was not finite.
    #[error("trend threshold must be finite")]
    NonFiniteThreshold,
    /// An ANOMALY condition's `sensitivity` was not positive.
    #[error("anomaly sensitivity must be positive")]
    NonPositiveSensitivity,
    /// An ANOMALY condition's `min_data_points` was zero.
    #[error("anomaly min_data_points must be at least 1")]
    ZeroMinDataPoints,
    /// A COMPOUND condition had no children.
    #[error("compound condition must have at least one child")]
    EmptyCompoundConditions,
    /// A COMPOUND `NOT` condition did not have exactly one child.
    #[error("NOT condition must have exactly one child, got {0}")]
    NotRequiresExactlyOneCondition(usize),
    /// An EVENT condition's `event_type` was empty.
    #[error("event_type must not be empty")]
    EmptyEventType,
    /// An EVENT condition's property field was empty.
    #[error("event property field must not be empty")]
    EmptyPropertyField,
    /// A PATTERN condition's `pattern` was empty.
    #[error("pattern must not be empty")]
    EmptyPattern,
    /// A PATTERN condition's `field` was empty.
    #[error("pattern field must not be empty")]
    EmptyPatternField,
}
