// crates/sentinel-cli/src/dto.rs
// ============================================================================
// Module: Command Input DTOs
// Description: Deserialize-friendly mirrors of engine types that are lifetime-bound or borrow data.
// Purpose: Let select-resolution accept plain JSON without forcing lifetimes onto the engine's API.
// Dependencies: sentinel-core, sentinel-engine, serde_json
// ============================================================================

//! ## Overview
//! None of [`sentinel_engine::Candidate`], [`sentinel_engine::ScoringInput`],
//! or [`sentinel_engine::ImpactInput`] (nor their leaf input structs) derive
//! `Deserialize` — they're built for an in-process caller that already owns
//! the data, not for a wire format. This module defines owned mirrors of
//! each one, with `From`/`as_*` conversions into the engine's borrowed
//! types, following the same composition-root boundary `sentinel-config`
//! draws between its own plain DTOs and the engine/broker runtime types
//! (see `DESIGN.md`).

use std::collections::HashMap;

use sentinel_core::ActionId;
use sentinel_core::Context;
use sentinel_engine::AddLevel;
use sentinel_engine::BusinessImpactInput;
use sentinel_engine::Candidate;
use sentinel_engine::ContextualFactors;
use sentinel_engine::DataImpactInput;
use sentinel_engine::DataLevel;
use sentinel_engine::HistoricalOutcome;
use sentinel_engine::ImpactInput;
use sentinel_engine::PatternMatch;
use sentinel_engine::PipelineImpactInput;
use sentinel_engine::ResourceImpactInput;
use sentinel_engine::ScoringInput;
use serde::Deserialize;
use serde_json::Value;

/// Owned mirror of [`sentinel_engine::AddLevel`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddLevelDto {
    /// Contributes nothing.
    Low,
    /// Contributes the table's medium add-on.
    Medium,
    /// Contributes the table's high add-on.
    High,
}

impl From<AddLevelDto> for AddLevel {
    fn from(value: AddLevelDto) -> Self {
        match value {
            AddLevelDto::Low => Self::Low,
            AddLevelDto::Medium => Self::Medium,
            AddLevelDto::High => Self::High,
        }
    }
}

/// Owned mirror of [`sentinel_engine::DataLevel`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLevelDto {
    /// Below a notable threshold.
    Low,
    /// Typical, unremarkable.
    Medium,
    /// Above a notable threshold.
    High,
}

impl From<DataLevelDto> for DataLevel {
    fn from(value: DataLevelDto) -> Self {
        match value {
            DataLevelDto::Low => Self::Low,
            DataLevelDto::Medium => Self::Medium,
            DataLevelDto::High => Self::High,
        }
    }
}

/// Owned mirror of [`sentinel_engine::HistoricalOutcome`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoricalOutcomeDto {
    /// Whether that attempt succeeded.
    pub succeeded: bool,
    /// Recency weight in `[0,1]`.
    pub recency_weight: f64,
}

impl From<HistoricalOutcomeDto> for HistoricalOutcome {
    fn from(value: HistoricalOutcomeDto) -> Self {
        Self { succeeded: value.succeeded, recency_weight: value.recency_weight }
    }
}

/// Owned mirror of [`sentinel_engine::PatternMatch`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PatternMatchDto {
    /// Similarity of the current issue to the matched pattern, `[0,1]`.
    pub issue_similarity: f64,
    /// Similarity of the candidate action to the pattern's canonical action, `[0,1]`.
    pub action_similarity: f64,
}

impl From<PatternMatchDto> for PatternMatch {
    fn from(value: PatternMatchDto) -> Self {
        Self {
            issue_similarity: value.issue_similarity,
            action_similarity: value.action_similarity,
        }
    }
}

/// Owned mirror of [`sentinel_engine::ContextualFactors`].
#[derive(Debug, Clone, Deserialize)]
pub struct ContextualFactorsDto {
    /// Whether `now` falls within business hours for this deployment.
    pub business_hours: bool,
    /// Deployment environment tag (`"prod"`, `"stg"`, `"dev"`).
    pub environment: String,
    /// Whether a maintenance window is currently active.
    pub maintenance_window: bool,
}

impl From<&ContextualFactorsDto> for ContextualFactors {
    fn from(value: &ContextualFactorsDto) -> Self {
        Self {
            business_hours: value.business_hours,
            environment: value.environment.clone(),
            maintenance_window: value.maintenance_window,
        }
    }
}

/// Owned mirror of [`sentinel_engine::DataImpactInput`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DataImpactInputDto {
    /// Row/record volume affected.
    pub volume: f64,
    /// Criticality add-on level.
    pub criticality: AddLevelDto,
    /// Visibility add-on level.
    pub visibility: AddLevelDto,
}

impl From<DataImpactInputDto> for DataImpactInput {
    fn from(value: DataImpactInputDto) -> Self {
        Self {
            volume: value.volume,
            criticality: value.criticality.into(),
            visibility: value.visibility.into(),
        }
    }
}

/// Owned mirror of [`sentinel_engine::PipelineImpactInput`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PipelineImpactInputDto {
    /// Execution-time add-on level.
    pub execution_time: AddLevelDto,
    /// Number of downstream dependencies.
    pub dep_count: u32,
    /// Pipeline-criticality add-on level.
    pub pipeline_criticality: AddLevelDto,
}

impl From<PipelineImpactInputDto> for PipelineImpactInput {
    fn from(value: PipelineImpactInputDto) -> Self {
        Self {
            execution_time: value.execution_time.into(),
            dep_count: value.dep_count,
            pipeline_criticality: value.pipeline_criticality.into(),
        }
    }
}

/// Owned mirror of [`sentinel_engine::BusinessImpactInput`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BusinessImpactInputDto {
    /// Base score for the business-criticality tier, `[0,1]`.
    pub criticality_base: f64,
    /// Whether the affected SLA deadline is approaching.
    pub approaching_sla: bool,
    /// Visibility add-on level.
    pub visibility: AddLevelDto,
    /// Whether this affects reporting/analytics consumers.
    pub affects_reporting: bool,
}

impl From<BusinessImpactInputDto> for BusinessImpactInput {
    fn from(value: BusinessImpactInputDto) -> Self {
        Self {
            criticality_base: value.criticality_base,
            approaching_sla: value.approaching_sla,
            visibility: value.visibility.into(),
            affects_reporting: value.affects_reporting,
        }
    }
}

/// Owned mirror of [`sentinel_engine::ResourceImpactInput`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResourceImpactInputDto {
    /// Compute add-on level.
    pub compute: AddLevelDto,
    /// Storage add-on level.
    pub storage: AddLevelDto,
    /// Cost add-on level.
    pub cost: AddLevelDto,
    /// Scaling factor.
    pub scale_factor: f64,
}

impl From<ResourceImpactInputDto> for ResourceImpactInput {
    fn from(value: ResourceImpactInputDto) -> Self {
        Self {
            compute: value.compute.into(),
            storage: value.storage.into(),
            cost: value.cost.into(),
            scale_factor: value.scale_factor,
        }
    }
}

/// Owned mirror of [`sentinel_engine::ScoringInput`].
#[derive(Debug, Deserialize)]
pub struct ScoringInputDto {
    /// Prior attempts of this action, most relevant to least.
    #[serde(default)]
    pub history: Vec<HistoricalOutcomeDto>,
    /// Best matching historical pattern, if any.
    #[serde(default)]
    pub pattern: Option<PatternMatchDto>,
    /// Per-dimension data-volume levels feeding the data-characteristics factor.
    #[serde(default)]
    pub data_levels: Vec<DataLevelDto>,
    /// Contextual factors (business hours, environment, maintenance window).
    pub contextual: ContextualFactorsDto,
}

/// Owned, converted form of a [`ScoringInputDto`], cheap to borrow into
/// [`ScoringInput`].
pub struct OwnedScoringInput {
    history: Vec<HistoricalOutcome>,
    pattern: Option<PatternMatch>,
    data_levels: Vec<DataLevel>,
    contextual: ContextualFactors,
}

impl From<&ScoringInputDto> for OwnedScoringInput {
    fn from(value: &ScoringInputDto) -> Self {
        Self {
            history: value.history.iter().copied().map(HistoricalOutcome::from).collect(),
            pattern: value.pattern.map(PatternMatch::from),
            data_levels: value.data_levels.iter().copied().map(DataLevel::from).collect(),
            contextual: ContextualFactors::from(&value.contextual),
        }
    }
}

impl OwnedScoringInput {
    /// Borrows this owned input into the engine's lifetime-bound type.
    #[must_use]
    pub fn as_scoring_input(&self) -> ScoringInput<'_> {
        ScoringInput {
            history: &self.history,
            pattern: self.pattern,
            data_levels: &self.data_levels,
            contextual: &self.contextual,
        }
    }
}

/// Owned mirror of [`sentinel_engine::ImpactInput`] (minus `action_type`,
/// which lives on the enclosing [`CandidateDto`]).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ImpactInputDto {
    /// DATA category inputs.
    pub data: DataImpactInputDto,
    /// PIPELINE category inputs.
    pub pipeline: PipelineImpactInputDto,
    /// BUSINESS category inputs.
    pub business: BusinessImpactInputDto,
    /// RESOURCE category inputs.
    pub resource: ResourceImpactInputDto,
}

/// One candidate action in a [`super::commands::SelectResolutionInput`].
#[derive(Debug, Deserialize)]
pub struct CandidateDto {
    /// Unique identifier for this action; generated if omitted.
    #[serde(default = "generate_action_id")]
    pub action_id: String,
    /// Action type tag.
    pub action_type: String,
    /// Parameters this candidate would be executed with.
    #[serde(default)]
    pub action_details: Context,
    /// Confidence-scoring input.
    pub confidence: ScoringInputDto,
    /// Impact-scoring input.
    pub impact: ImpactInputDto,
}

fn generate_action_id() -> String {
    ActionId::generate().to_string()
}

/// Owned, converted form of a [`CandidateDto`], cheap to borrow into
/// [`Candidate`].
pub struct OwnedCandidate {
    action_id: ActionId,
    action_type: String,
    action_details: Context,
    confidence: OwnedScoringInput,
    impact: ImpactInputDto,
}

impl From<&CandidateDto> for OwnedCandidate {
    fn from(value: &CandidateDto) -> Self {
        Self {
            action_id: ActionId::new(value.action_id.clone()),
            action_type: value.action_type.clone(),
            action_details: value.action_details.clone(),
            confidence: OwnedScoringInput::from(&value.confidence),
            impact: value.impact,
        }
    }
}

impl OwnedCandidate {
    /// Borrows this owned candidate into the engine's lifetime-bound
    /// [`Candidate`] type.
    #[must_use]
    pub fn as_candidate(&self) -> Candidate<'_> {
        Candidate {
            action_id: self.action_id.clone(),
            action_type: &self.action_type,
            action_details: self.action_details.clone(),
            confidence_input: self.confidence.as_scoring_input(),
            impact_input: ImpactInput {
                action_type: &self.action_type,
                data: self.impact.data.into(),
                pipeline: self.impact.pipeline.into(),
                business: self.impact.business.into(),
                resource: self.impact.resource.into(),
            },
        }
    }
}

/// `select-resolution` command input: the issue plus every candidate action
/// to score.
#[derive(Debug, Deserialize)]
pub struct SelectResolutionInput {
    /// Issue this resolution addresses.
    pub issue_id: String,
    /// Candidate healing actions, scored and ranked by the selector.
    pub candidates: Vec<CandidateDto>,
    /// Minimum `confidence.overall_score` a candidate must clear.
    pub min_confidence: f64,
    /// Maximum `impact.overall` a candidate may have.
    pub max_impact: f64,
    /// Risk score in `[0,1]` shared by every candidate this call.
    #[serde(default)]
    pub risk_score: f64,
    /// `SEMI_AUTOMATIC`'s risk ceiling.
    #[serde(default = "default_semi_automatic_risk_threshold")]
    pub semi_automatic_risk_threshold: f64,
    /// Whether `now` falls within business hours.
    #[serde(default)]
    pub business_hours: bool,
    /// Whether this deployment requires approval for any action decided
    /// during business hours, regardless of confidence or impact. No
    /// `sentinel-config` section carries this (see `DESIGN.md`'s resolved
    /// Open Question), so it travels with the request instead.
    #[serde(default)]
    pub business_hours_require_approval: bool,
    /// The user or system requesting this resolution.
    pub requester: String,
}

const fn default_semi_automatic_risk_threshold() -> f64 {
    0.5
}

/// `process-metrics` command input.
#[derive(Debug, Deserialize)]
pub struct ProcessMetricsInput {
    /// The metrics payload evaluated against THRESHOLD/TREND/ANOMALY/COMPOUND rules.
    pub metrics: Value,
    /// Context merged into every alert this call admits.
    #[serde(default)]
    pub context: Context,
    /// Named historical series, keyed by metric name, for TREND/ANOMALY rules.
    #[serde(default)]
    pub historical_series: HashMap<String, Vec<f64>>,
    /// Pipeline component raising these metrics, if any.
    pub component: Option<String>,
    /// Pipeline execution these metrics pertain to, if any.
    pub execution_id: Option<String>,
    /// Restrict evaluation to these rule IDs; omit to evaluate every rule.
    pub only: Option<Vec<String>>,
}

/// One entry of a `process-events` command input.
#[derive(Debug, Deserialize)]
pub struct EventDto {
    /// The event's type tag, matched against EVENT/PATTERN rule conditions.
    pub event_type: String,
    /// The event's originating subsystem, if any.
    #[serde(default)]
    pub event_source: Option<String>,
    /// Free-form event payload.
    #[serde(default)]
    pub properties: Value,
}

/// `process-events` command input: every event is evaluated independently
/// and the admitted alert IDs are concatenated, in order (spec §6:
/// `process_events(events, context) -> [alert_id]`).
#[derive(Debug, Deserialize)]
pub struct ProcessEventsInput {
    /// The events to evaluate.
    pub events: Vec<EventDto>,
    /// Context merged into every alert this call admits.
    #[serde(default)]
    pub context: Context,
    /// Pipeline component raising these events, if any.
    pub component: Option<String>,
    /// Pipeline execution these events pertain to, if any.
    pub execution_id: Option<String>,
    /// Restrict evaluation to these rule IDs; omit to evaluate every rule.
    pub only: Option<Vec<String>>,
}
