// crates/sentinel-core/src/model.rs
// ============================================================================
// Module: Data Model
// Description: Alert, rule, and resolution-lifecycle record types.
// Purpose: Define the durable and short-lived records shared across every component.
// Dependencies: crate::ids, serde, serde_json, time
// ============================================================================

//! ## Overview
//! These are the records the core hands across component boundaries. Owned
//! types (`Alert`, `ApprovalRequest`, `Resolution`) carry explicit lifecycle
//! invariants enforced by their transition methods rather than by callers
//! mutating fields directly.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::ids::ActionId;
use crate::ids::AlertId;
use crate::ids::ExecutionId;
use crate::ids::GroupId;
use crate::ids::IssueId;
use crate::ids::RequestId;
use crate::ids::ResolutionId;
use crate::ids::RuleId;

/// Free-form context mapping carried on alerts, rules, and evaluation results.
pub type Context = BTreeMap<String, Value>;

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Alert and rule severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational only; no action implied.
    Info,
    /// Worth noting, no urgency.
    Low,
    /// Should be looked at this shift.
    Medium,
    /// Needs prompt attention.
    High,
    /// Needs immediate attention.
    Critical,
}

impl Severity {
    /// Whether alerts of this severity require acknowledgment by policy
    /// default (CRITICAL and HIGH do; the rest don't), per the original
    /// implementation's alert model.
    #[must_use]
    pub const fn requires_acknowledgment_by_default(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

// ============================================================================
// SECTION: Notification Channel
// ============================================================================

/// A notification delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    /// Microsoft Teams (or compatible webhook) channel.
    Teams,
    /// SMTP email channel.
    Email,
}

// ============================================================================
// SECTION: Alert
// ============================================================================

/// Lifecycle status of an [`Alert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    /// Freshly created, not yet acted on.
    New,
    /// A human has acknowledged it.
    Acknowledged,
    /// Terminal: the underlying condition was resolved.
    Resolved,
    /// Terminal: suppressed as a duplicate or by rate limit.
    Suppressed,
}

impl AlertStatus {
    /// Whether this status is terminal (no further transitions are possible).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Suppressed)
    }
}

/// A single attempt to deliver a notification for an alert.
///
/// Owned by the parent [`Alert`]; append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAttempt {
    /// Channel this attempt was sent on.
    pub channel: Channel,
    /// Recipient address/identifier for the channel.
    pub recipient: String,
    /// Whether the transport reported success.
    pub success: bool,
    /// Free-form details (error message, transport message id, ...).
    pub details: Context,
    /// When the attempt completed.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Details recorded when an alert is acknowledged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgmentDetails {
    /// Who acknowledged it.
    pub actor: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Details recorded when an alert is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionDetails {
    /// Who or what resolved it.
    pub actor: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Errors returned by [`Alert`] state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AlertTransitionError {
    /// The alert is already in a terminal status; the record was not mutated.
    #[error("alert is already in terminal status {0:?}")]
    AlreadyTerminal(AlertStatus),
    /// The requested transition is not allowed from the current status.
    #[error("cannot transition from {from:?} to {to:?}")]
    NotAllowed {
        /// Current status.
        from: AlertStatus,
        /// Status that was requested.
        to: AlertStatus,
    },
}

/// A detected condition worth human or automated attention.
///
/// Owned by the Alert Generator on creation; stored in the alert repository
/// afterwards. All mutation flows through the transition methods below —
/// nothing else may change `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Opaque unique identifier.
    pub alert_id: AlertId,
    /// String tag such as `pipeline_failure`, `rule_threshold`.
    pub alert_type: String,
    /// Human-readable description.
    pub description: String,
    /// Severity of the condition.
    pub severity: Severity,
    /// Free-form context mapping.
    pub context: Context,
    /// Pipeline component that raised it.
    pub component: Option<String>,
    /// Pipeline execution this alert pertains to, if any.
    pub execution_id: Option<ExecutionId>,
    /// Which collector/subsystem raised it (supplemental field grounded on
    /// the original implementation's alert model).
    pub source: String,
    /// Current lifecycle status.
    pub status: AlertStatus,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last mutation time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// When acknowledged, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub acknowledged_at: Option<OffsetDateTime>,
    /// When resolved, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    /// IDs of alerts correlated with this one, insertion order preserved.
    pub related_alerts: Vec<AlertId>,
    /// Append-only delivery history.
    pub notifications: Vec<NotificationAttempt>,
    /// Set once, on acknowledgment.
    pub acknowledgment_details: Option<AcknowledgmentDetails>,
    /// Set once, on resolution.
    pub resolution_details: Option<ResolutionDetails>,
}

impl Alert {
    /// Whether this alert's severity requires acknowledgment and no
    /// acknowledgment has been recorded yet.
    #[must_use]
    pub fn requires_acknowledgment(&self) -> bool {
        self.severity.requires_acknowledgment_by_default() && self.acknowledgment_details.is_none()
    }

    /// Transitions `NEW|ACKNOWLEDGED → ACKNOWLEDGED`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertTransitionError::AlreadyTerminal`] if the alert is
    /// already `RESOLVED` or `SUPPRESSED`.
    pub fn acknowledge(
        &mut self,
        actor: impl Into<String>,
        notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<(), AlertTransitionError> {
        if self.status.is_terminal() {
            return Err(AlertTransitionError::AlreadyTerminal(self.status));
        }
        self.status = AlertStatus::Acknowledged;
        self.acknowledged_at.get_or_insert(now);
        self.acknowledgment_details = Some(AcknowledgmentDetails {
            actor: actor.into(),
            notes,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Transitions `NEW|ACKNOWLEDGED → RESOLVED` (terminal).
    ///
    /// # Errors
    ///
    /// Returns [`AlertTransitionError::AlreadyTerminal`] if already terminal.
    pub fn resolve(
        &mut self,
        actor: impl Into<String>,
        notes: Option<String>,
        now: OffsetDateTime,
    ) -> Result<(), AlertTransitionError> {
        if self.status.is_terminal() {
            return Err(AlertTransitionError::AlreadyTerminal(self.status));
        }
        self.status = AlertStatus::Resolved;
        self.resolved_at.get_or_insert(now);
        self.resolution_details = Some(ResolutionDetails {
            actor: actor.into(),
            notes,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Transitions `NEW → SUPPRESSED` (terminal).
    ///
    /// Suppressing an already-suppressed (or otherwise terminal) alert is a
    /// no-op that returns an error rather than mutating the record again —
    /// this is what makes suppression idempotent (testable property 2).
    ///
    /// # Errors
    ///
    /// Returns [`AlertTransitionError::AlreadyTerminal`] if already terminal.
    pub fn suppress(
        &mut self,
        reason: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<(), AlertTransitionError> {
        if self.status.is_terminal() {
            return Err(AlertTransitionError::AlreadyTerminal(self.status));
        }
        self.status = AlertStatus::Suppressed;
        self.context.insert("suppression".to_string(), Value::String(reason.into()));
        self.updated_at = now;
        Ok(())
    }
}

// ============================================================================
// SECTION: Rule
// ============================================================================

/// Comparison operator used by THRESHOLD conditions and EVENT property checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

/// `TREND` rule magnitude kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    /// Ordinary-least-squares slope of the series.
    Slope,
    /// Percent change from first to last point in the window.
    PercentChange,
    /// Absolute change from first to last point in the window.
    AbsoluteChange,
}

/// `TREND` rule directionality qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Magnitude must be positive and exceed the threshold.
    Increasing,
    /// Magnitude must be negative and its absolute value exceed the threshold.
    Decreasing,
    /// Absolute magnitude must exceed the absolute threshold, either sign.
    Any,
}

/// `PATTERN` rule string-matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Full regular-expression match.
    Regex,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
}

/// `COMPOUND` rule boolean operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompoundOperator {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
    /// Exactly one child, inverted.
    Not,
}

/// A single property condition within an `EVENT` rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCondition {
    /// Dot-path into the event's properties.
    pub field: String,
    /// Operator to apply.
    pub operator: ComparisonOperator,
    /// Value to compare against.
    pub value: Value,
}

/// Type-specific condition payload for one of the six rule families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule_type")]
pub enum RuleConditions {
    /// THRESHOLD: compare a metric at `metric_path` against `value`.
    Threshold {
        /// Dot-path into the metrics mapping.
        metric_path: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Value compared against.
        value: Value,
    },
    /// TREND: evaluate the direction/magnitude of a metric's recent series.
    Trend {
        /// Dot-path into the metrics mapping. The value at this path is
        /// expected to resolve to a numeric series (`Vec<f64>`).
        metric_path: String,
        /// Number of most-recent points to consider.
        window: usize,
        /// Which magnitude to compute.
        trend_type: TrendType,
        /// Magnitude threshold.
        threshold: f64,
        /// Direction qualifier; defaults to `Any`.
        #[serde(default = "default_trend_direction")]
        direction: TrendDirection,
    },
    /// ANOMALY: ask the injected anomaly detector about a metric's series.
    Anomaly {
        /// Dot-path into the metrics mapping.
        metric_path: String,
        /// Detector sensitivity.
        #[serde(default = "default_sensitivity")]
        sensitivity: f64,
        /// Detector algorithm name.
        #[serde(default = "default_algorithm")]
        algorithm: String,
        /// Minimum number of data points required to evaluate.
        #[serde(default = "default_min_data_points")]
        min_data_points: usize,
    },
    /// COMPOUND: recursive boolean composition of nested conditions.
    Compound {
        /// Boolean operator.
        operator: CompoundOperator,
        /// Child conditions (exactly one for `NOT`).
        conditions: Vec<RuleConditions>,
    },
    /// EVENT: match an event's type and properties.
    Event {
        /// Expected event type.
        event_type: String,
        /// Optional expected event source.
        event_source: Option<String>,
        /// Per-field conditions, all of which must pass.
        #[serde(default)]
        properties: Vec<PropertyCondition>,
    },
    /// PATTERN: string-match a field resolved by dot-path.
    Pattern {
        /// Pattern to match against.
        pattern: String,
        /// Dot-path to the target field.
        field: String,
        /// Matching strategy.
        match_type: MatchType,
    },
}

const fn default_trend_direction() -> TrendDirection {
    TrendDirection::Any
}

const fn default_sensitivity() -> f64 {
    2.0
}

fn default_algorithm() -> String {
    "z_score".to_string()
}

const fn default_min_data_points() -> usize {
    5
}

/// The rule family tag, independent of the condition payload.
///
/// Kept alongside [`RuleConditions`] (rather than derived from it) because
/// callers filter rule sets by family (`evaluate_metrics` vs.
/// `evaluate_events`) without needing to destructure the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleType {
    /// See [`RuleConditions::Threshold`].
    Threshold,
    /// See [`RuleConditions::Trend`].
    Trend,
    /// See [`RuleConditions::Anomaly`].
    Anomaly,
    /// See [`RuleConditions::Compound`].
    Compound,
    /// See [`RuleConditions::Event`].
    Event,
    /// See [`RuleConditions::Pattern`].
    Pattern,
}

impl RuleType {
    /// Whether this family is evaluated by `evaluate_metrics` (as opposed to
    /// `evaluate_events`).
    #[must_use]
    pub const fn is_metric_family(self) -> bool {
        matches!(self, Self::Threshold | Self::Trend | Self::Anomaly | Self::Compound)
    }
}

impl RuleConditions {
    /// Returns the family tag for this condition payload.
    #[must_use]
    pub const fn rule_type(&self) -> RuleType {
        match self {
            Self::Threshold { .. } => RuleType::Threshold,
            Self::Trend { .. } => RuleType::Trend,
            Self::Anomaly { .. } => RuleType::Anomaly,
            Self::Compound { .. } => RuleType::Compound,
            Self::Event { .. } => RuleType::Event,
            Self::Pattern { .. } => RuleType::Pattern,
        }
    }
}

/// Declarative rule configuration, loaded at startup and immutable during
/// evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier.
    pub rule_id: RuleId,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Type-specific condition payload.
    pub conditions: RuleConditions,
    /// Severity assigned to alerts this rule raises.
    pub severity: Severity,
    /// Free-form action hints attached to the rule (consumed by the
    /// Generator/Selector, not interpreted by the engine itself).
    #[serde(default)]
    pub actions: Vec<String>,
    /// Whether this rule currently participates in evaluation.
    pub enabled: bool,
    /// Free-form metadata; may contain a `group` key for rule grouping.
    #[serde(default)]
    pub metadata: Context,
}

impl Rule {
    /// The rule family, derived from the condition payload.
    #[must_use]
    pub const fn rule_type(&self) -> RuleType {
        self.conditions.rule_type()
    }

    /// The optional group name from `metadata.group`.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.metadata.get("group").and_then(Value::as_str)
    }
}

/// Result of evaluating one rule, consumed by the Generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluationResult {
    /// Rule that was evaluated.
    pub rule_id: RuleId,
    /// Rule's name at evaluation time.
    pub rule_name: String,
    /// Rule's family.
    pub rule_type: RuleType,
    /// Whether the rule triggered.
    pub triggered: bool,
    /// Severity to use if an alert is raised for this result.
    pub severity: Severity,
    /// Free-form evaluation details (may include `status: "error"`).
    pub details: Context,
    /// Context merged from the rule and the evaluation call.
    pub context: Context,
    /// When evaluation completed.
    #[serde(with = "time::serde::rfc3339")]
    pub evaluation_time: OffsetDateTime,
}

// ============================================================================
// SECTION: Alert Group
// ============================================================================

/// Snapshot of the suppression policy in effect when a group was opened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuppressionPolicySnapshot {
    /// Correlation window, in seconds.
    pub correlation_window_secs: u64,
    /// Rate-limit count threshold, if rate limiting is enabled for this type.
    pub rate_limit_count: Option<u32>,
    /// Rate-limit window, in seconds, if enabled.
    pub rate_limit_window_secs: Option<u64>,
    /// Group time-to-live, in seconds.
    pub group_ttl_secs: u64,
}

/// An open set of related alerts sharing a correlation key.
///
/// Owned by the Correlator; created on the first alert that doesn't match
/// any open group, retired when the last member is resolved or the group
/// TTL elapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertGroup {
    /// Unique identifier.
    pub group_id: GroupId,
    /// Member alert IDs.
    pub members: Vec<AlertId>,
    /// The first (non-suppressed) alert in the group.
    pub primary_alert_id: AlertId,
    /// When the group was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub opened_at: OffsetDateTime,
    /// Suppression policy in effect when the group was opened.
    pub policy: SuppressionPolicySnapshot,
}

// ============================================================================
// SECTION: Approval Request
// ============================================================================

/// Lifecycle status of an [`ApprovalRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved by a human.
    Approved,
    /// Rejected by a human.
    Rejected,
    /// TTL elapsed before a decision was made.
    Expired,
}

impl ApprovalStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Impact severity bucket derived from an overall impact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImpactLevel {
    /// `< 0.3`
    Low,
    /// `< 0.6`
    Medium,
    /// `< 0.8`
    High,
    /// `>= 0.8`
    Critical,
}

impl ImpactLevel {
    /// Maps an overall impact score in `[0,1]` to its bucket.
    #[must_use]
    pub fn from_overall(overall: f64) -> Self {
        if overall < 0.3 {
            Self::Low
        } else if overall < 0.6 {
            Self::Medium
        } else if overall < 0.8 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

/// Errors returned by [`ApprovalRequest`] state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalTransitionError {
    /// The request is no longer pending (already decided, or expired).
    #[error("approval request is not pending (status is {0:?})")]
    NotPending(ApprovalStatus),
}

/// A durable record mediating human sign-off on a risky or low-confidence
/// resolution. Owned by the Approval Manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Unique identifier.
    pub request_id: RequestId,
    /// The healing action this request is for.
    pub action_id: ActionId,
    /// Healing action type tag.
    pub action_type: String,
    /// Issue the action addresses.
    pub issue_id: IssueId,
    /// Human-readable issue description.
    pub issue_description: String,
    /// Free-form action parameters.
    pub action_details: Context,
    /// Confidence score computed for the action.
    pub confidence_score: f64,
    /// Overall impact score computed for the action.
    pub impact_score: f64,
    /// Impact bucket derived from `impact_score`.
    pub impact_level: ImpactLevel,
    /// Current lifecycle status.
    pub status: ApprovalStatus,
    /// Who/what requested approval.
    pub requester: String,
    /// Who approved or rejected, once decided.
    pub approver: Option<String>,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last mutation time.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// When this request expires if undecided.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// Reason given for rejection, if rejected.
    pub rejection_reason: Option<String>,
    /// Free-form context.
    pub context: Context,
}

impl ApprovalRequest {
    /// Lazily applies expiry: if `status == PENDING` and `now > expires_at`,
    /// transitions to `EXPIRED` and returns `true`. Callers that read a
    /// request should call this first so reads observe expiry even between
    /// sweeps.
    pub fn apply_lazy_expiry(&mut self, now: OffsetDateTime) -> bool {
        if self.status == ApprovalStatus::Pending && now > self.expires_at {
            self.status = ApprovalStatus::Expired;
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    /// Transitions `PENDING → APPROVED`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalTransitionError::NotPending`] if not pending
    /// (including if lazy expiry just fired).
    pub fn approve(
        &mut self,
        approver: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<(), ApprovalTransitionError> {
        self.apply_lazy_expiry(now);
        if self.status != ApprovalStatus::Pending {
            return Err(ApprovalTransitionError::NotPending(self.status));
        }
        self.status = ApprovalStatus::Approved;
        self.approver = Some(approver.into());
        self.updated_at = now;
        Ok(())
    }

    /// Transitions `PENDING → REJECTED`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalTransitionError::NotPending`] if not pending
    /// (including if lazy expiry just fired).
    pub fn reject(
        &mut self,
        approver: impl Into<String>,
        reason: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<(), ApprovalTransitionError> {
        self.apply_lazy_expiry(now);
        if self.status != ApprovalStatus::Pending {
            return Err(ApprovalTransitionError::NotPending(self.status));
        }
        self.status = ApprovalStatus::Rejected;
        self.approver = Some(approver.into());
        self.rejection_reason = Some(reason.into());
        self.updated_at = now;
        Ok(())
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Lifecycle status of a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolutionStatus {
    /// Chosen, not yet attempted (or returned to this state after a failed attempt).
    Pending,
    /// Currently being executed by the healing executor.
    InProgress,
    /// Terminal: executed successfully.
    Success,
    /// Terminal: exhausted attempts or was rejected/expired after requiring approval.
    Failed,
    /// Waiting on an [`ApprovalRequest`] before it may proceed.
    ApprovalRequired,
}

impl ResolutionStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Per-category impact scores plus the overall weighted score, as computed
/// by the Impact Analyzer (C7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    /// Data-category impact in `[0,1]`.
    pub data: f64,
    /// Pipeline-category impact in `[0,1]`.
    pub pipeline: f64,
    /// Business-category impact in `[0,1]`.
    pub business: f64,
    /// Resource-category impact in `[0,1]`.
    pub resource: f64,
    /// Weighted mean of the four categories, in `[0,1]`.
    pub overall: f64,
    /// Bucket derived from `overall`.
    pub level: ImpactLevel,
}

/// Per-factor confidence scores plus the overall weighted score, as computed
/// by the Confidence Scorer (C6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// Historical-success factor in `[0,1]`.
    pub historical_success_factor: f64,
    /// Pattern-match factor in `[0,1]`.
    pub pattern_match_factor: f64,
    /// Data-characteristics factor in `[0,1]`.
    pub data_characteristics_factor: f64,
    /// Contextual factor in `[0,1]`.
    pub contextual_factor: f64,
    /// Weighted sum of the four factors, clamped to `[0,1]`.
    pub overall_score: f64,
}

impl ConfidenceScore {
    /// Whether `overall_score` meets or exceeds `threshold`.
    #[must_use]
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.overall_score >= threshold
    }
}

/// A selected, possibly-executed healing action for one issue.
///
/// Owned by the Resolution Selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// Unique identifier.
    pub resolution_id: ResolutionId,
    /// Issue this resolution addresses.
    pub issue_id: IssueId,
    /// Chosen healing action.
    pub action_id: ActionId,
    /// Healing action type tag.
    pub action_type: String,
    /// Free-form action parameters.
    pub action_details: Context,
    /// Current lifecycle status.
    pub status: ResolutionStatus,
    /// Confidence computed for the chosen action.
    pub confidence_score: ConfidenceScore,
    /// Impact computed for the chosen action.
    pub impact_analysis: ImpactAnalysis,
    /// Whether this resolution required (or requires) manual approval.
    pub requires_approval: bool,
    /// The approval request backing this resolution, if one was created.
    pub approval_id: Option<RequestId>,
    /// Last known status of the backing approval request, if any.
    pub approval_status: Option<ApprovalStatus>,
    /// Number of execution attempts made so far.
    pub attempt_count: u32,
    /// Maximum attempts allowed before `FAILED` becomes terminal.
    pub max_attempts: u32,
    /// Whether healing mode was `RECOMMENDATION_ONLY` when this was created.
    pub recommendation_only: bool,
    /// When the (most recent) execution attempt completed, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub executed_at: Option<OffsetDateTime>,
    /// Free-form result details from the most recent execution attempt.
    pub execution_result: Option<Context>,
}

/// Errors returned by [`Resolution`] state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionTransitionError {
    /// The resolution is already in a terminal status.
    #[error("resolution is already terminal (status is {0:?})")]
    AlreadyTerminal(ResolutionStatus),
    /// The requested transition is not allowed from the current status.
    #[error("cannot transition from {from:?} to {to:?}")]
    NotAllowed {
        /// Current status.
        from: ResolutionStatus,
        /// Status that was requested.
        to: ResolutionStatus,
    },
}

impl Resolution {
    /// Transitions `PENDING → IN_PROGRESS`, incrementing `attempt_count`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionTransitionError::NotAllowed`] unless currently `PENDING`.
    pub fn begin_attempt(&mut self) -> Result<(), ResolutionTransitionError> {
        if self.status != ResolutionStatus::Pending {
            return Err(ResolutionTransitionError::NotAllowed {
                from: self.status,
                to: ResolutionStatus::InProgress,
            });
        }
        self.attempt_count += 1;
        self.status = ResolutionStatus::InProgress;
        Ok(())
    }

    /// Transitions `IN_PROGRESS → SUCCESS` (terminal).
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionTransitionError::NotAllowed`] unless currently `IN_PROGRESS`.
    pub fn mark_success(
        &mut self,
        result: Context,
        now: OffsetDateTime,
    ) -> Result<(), ResolutionTransitionError> {
        if self.status != ResolutionStatus::InProgress {
            return Err(ResolutionTransitionError::NotAllowed {
                from: self.status,
                to: ResolutionStatus::Success,
            });
        }
        self.status = ResolutionStatus::Success;
        self.executed_at = Some(now);
        self.execution_result = Some(result);
        Ok(())
    }

    /// Transitions `IN_PROGRESS → FAILED` if attempts are exhausted, or back
    /// to `PENDING` for another attempt otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionTransitionError::NotAllowed`] unless currently `IN_PROGRESS`.
    pub fn mark_attempt_failed(
        &mut self,
        result: Context,
        now: OffsetDateTime,
    ) -> Result<(), ResolutionTransitionError> {
        if self.status != ResolutionStatus::InProgress {
            return Err(ResolutionTransitionError::NotAllowed {
                from: self.status,
                to: ResolutionStatus::Failed,
            });
        }
        self.executed_at = Some(now);
        self.execution_result = Some(result);
        self.status = if self.attempt_count >= self.max_attempts {
            ResolutionStatus::Failed
        } else {
            ResolutionStatus::Pending
        };
        Ok(())
    }

    /// Transitions `PENDING → APPROVAL_REQUIRED`, recording the backing
    /// approval request.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionTransitionError::NotAllowed`] unless currently `PENDING`.
    pub fn require_approval(
        &mut self,
        request_id: RequestId,
    ) -> Result<(), ResolutionTransitionError> {
        if self.status != ResolutionStatus::Pending {
            return Err(ResolutionTransitionError::NotAllowed {
                from: self.status,
                to: ResolutionStatus::ApprovalRequired,
            });
        }
        self.status = ResolutionStatus::ApprovalRequired;
        self.requires_approval = true;
        self.approval_id = Some(request_id);
        self.approval_status = Some(ApprovalStatus::Pending);
        Ok(())
    }

    /// Resolves the pending approval outcome: `APPROVED → PENDING` (ready for
    /// execution), `REJECTED|EXPIRED → FAILED` (terminal).
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionTransitionError::NotAllowed`] unless currently `APPROVAL_REQUIRED`.
    pub fn apply_approval_outcome(
        &mut self,
        outcome: ApprovalStatus,
    ) -> Result<(), ResolutionTransitionError> {
        if self.status != ResolutionStatus::ApprovalRequired {
            return Err(ResolutionTransitionError::NotAllowed {
                from: self.status,
                to: ResolutionStatus::Pending,
            });
        }
        self.approval_status = Some(outcome);
        self.status = match outcome {
            ApprovalStatus::Approved => ResolutionStatus::Pending,
            ApprovalStatus::Rejected | ApprovalStatus::Expired => ResolutionStatus::Failed,
            ApprovalStatus::Pending => ResolutionStatus::ApprovalRequired,
        };
        Ok(())
    }
}

// ============================================================================
// SECTION: Escalation State
// ============================================================================

/// Per-alert escalation progress, owned by the Escalation Manager.
///
/// Evicted once the owning alert reaches a terminal status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EscalationState {
    /// Highest escalation level reached so far.
    pub level: u32,
    /// When that level was reached.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

// ============================================================================
// SECTION: Healing Mode
// ============================================================================

/// Operator-configured policy gate controlling whether the Resolution
/// Selector executes actions, recommends them, or is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingMode {
    /// Never execute or recommend.
    Disabled,
    /// Compute and record resolutions, never execute or request approval.
    RecommendationOnly,
    /// Execute only when risk is low enough per policy; otherwise require approval.
    SemiAutomatic,
    /// Execute automatically unless risk exceeds the automatic-mode ceiling.
    Automatic,
}
