// crates/sentinel-engine/src/resolution.rs
// ============================================================================
// Module: Resolution Selector (C9)
// Description: Picks the best candidate healing action for an issue and hands it to the executor.
// Purpose: Turn "something is wrong" into "here is what we're doing about it, and who signed off."
// Dependencies: crate::{confidence, impact, approval}, sentinel_core::{Resolution, HealingExecutor}
// ============================================================================

//! ## Overview
//! [`ResolutionSelector::select`] implements spec §4.9: score every
//! registered candidate action for an issue via the Confidence Scorer (C6)
//! and Impact Analyzer (C7), consult the Approval Manager (C8) for whether
//! the winner needs sign-off, filter by threshold, rank by
//! `priority_score = confidence.overall − impact.overall` with a
//! deterministic tie-break, then wrap the winner in a [`Resolution`] gated
//! by the current [`HealingMode`]. Execution is handed off to the injected
//! [`HealingExecutor`] and never awaited to completion here — "does not
//! block on long-running execution."

use std::sync::Arc;

use sentinel_core::ActionId;
use sentinel_core::Context;
use sentinel_core::ExecutionError;
use sentinel_core::HealingExecutor;
use sentinel_core::HealingMode;
use sentinel_core::IssueId;
use sentinel_core::Resolution;
use sentinel_core::ResolutionId;
use sentinel_core::ResolutionStatus;

use crate::approval::ApprovalManager;
use crate::approval::ApprovalPolicy;
use crate::confidence::ConfidenceScorer;
use crate::confidence::ScoringInput;
use crate::impact::ImpactAnalyzer;
use crate::impact::ImpactInput;
use crate::telemetry::EventSink;
use crate::telemetry::ResolutionDecidedEvent;

/// Default cap on execution attempts before a resolution's `FAILED` status
/// becomes terminal (spec §4.9: "default 3").
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// A registered healing action the selector may choose, before scoring.
pub struct Candidate<'a> {
    /// Unique identifier for this action.
    pub action_id: ActionId,
    /// Action type tag, consulted by the Impact Analyzer's base-impact
    /// table and the Approval Manager's per-type override.
    pub action_type: &'a str,
    /// Parameters this candidate would be executed with.
    pub action_details: Context,
    /// Confidence-scoring input specific to this candidate.
    pub confidence_input: ScoringInput<'a>,
    /// Impact-scoring input specific to this candidate.
    pub impact_input: ImpactInput<'a>,
}

/// Thresholds a candidate must clear to be selectable.
#[derive(Debug, Clone, Copy)]
pub struct SelectionThresholds {
    /// Minimum `confidence.overall_score`.
    pub min_confidence: f64,
    /// Maximum `impact.overall`.
    pub max_impact: f64,
}

/// Approval-policy context shared by every candidate for one selection
/// call (healing mode, risk ceilings, business-hours flag); only the
/// per-candidate confidence/impact vary.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalContext {
    /// Current healing mode.
    pub healing_mode: HealingMode,
    /// Risk score in `[0,1]` for this issue/action family.
    pub risk_score: f64,
    /// `SEMI_AUTOMATIC`'s risk ceiling.
    pub semi_automatic_risk_threshold: f64,
    /// Global confidence threshold.
    pub confidence_threshold: f64,
    /// Per-action-type override lookup.
    pub action_type_override: Option<crate::approval::ActionTypeOverride>,
    /// Whether `now` falls within business hours.
    pub business_hours: bool,
    /// Whether the business-hours policy bit requires approval during them.
    pub business_hours_require_approval: bool,
}

/// One scored candidate, ranked for selection.
struct Scored<'a> {
    action_id: ActionId,
    action_type: &'a str,
    action_details: Context,
    confidence: sentinel_core::ConfidenceScore,
    impact: sentinel_core::ImpactAnalysis,
    requires_approval: bool,
    priority_score: f64,
}

/// Outcome of one [`ResolutionSelector::select`] call.
pub enum SelectionOutcome {
    /// No candidate cleared the confidence/impact thresholds.
    NoCandidate,
    /// Healing mode is `DISABLED`; spec §4.9 says to return no resolution.
    Disabled,
    /// A resolution was created (recorded, possibly dispatched already).
    Resolution(Resolution),
}

/// Picks and (mode-permitting) dispatches the best candidate action.
pub struct ResolutionSelector {
    confidence_scorer: ConfidenceScorer,
    impact_analyzer: ImpactAnalyzer,
    approval_manager: Arc<ApprovalManager>,
    executor: Arc<dyn HealingExecutor>,
    events: Arc<dyn EventSink>,
    max_attempts: u32,
}

impl ResolutionSelector {
    /// Builds a selector from its collaborators plus the execution attempt
    /// cap (spec default [`DEFAULT_MAX_ATTEMPTS`]).
    #[must_use]
    pub fn new(
        confidence_scorer: ConfidenceScorer,
        impact_analyzer: ImpactAnalyzer,
        approval_manager: Arc<ApprovalManager>,
        executor: Arc<dyn HealingExecutor>,
        events: Arc<dyn EventSink>,
        max_attempts: u32,
    ) -> Self {
        Self {
            confidence_scorer,
            impact_analyzer,
            approval_manager,
            executor,
            events,
            max_attempts,
        }
    }

    /// Scores every candidate, selects the best one clearing `thresholds`,
    /// and wraps it in a [`Resolution`] per `healing_mode`. Never blocks on
    /// execution: a `PENDING` resolution not requiring approval is handed to
    /// the executor as a fire-and-forget task and returned immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`](sentinel_core::RepositoryError) if
    /// persisting the backing approval request fails.
    pub async fn select(
        &self,
        issue_id: IssueId,
        candidates: Vec<Candidate<'_>>,
        thresholds: SelectionThresholds,
        approval_context: ApprovalContext,
        requester: &str,
    ) -> Result<SelectionOutcome, sentinel_core::RepositoryError> {
        if approval_context.healing_mode == HealingMode::Disabled {
            return Ok(SelectionOutcome::Disabled);
        }

        let mut scored: Vec<Scored<'_>> = candidates
            .into_iter()
            .map(|candidate| self.score_candidate(candidate, &approval_context))
            .filter(|scored| {
                scored.confidence.overall_score >= thresholds.min_confidence
                    && scored.impact.overall <= thresholds.max_impact
            })
            .collect();

        scored.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    b.confidence
                        .overall_score
                        .partial_cmp(&a.confidence.overall_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| {
                    a.impact
                        .overall
                        .partial_cmp(&b.impact.overall)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.action_id.as_str().cmp(b.action_id.as_str()))
        });

        let Some(winner) = scored.into_iter().next() else {
            return Ok(SelectionOutcome::NoCandidate);
        };

        let mut resolution = self
            .build_resolution(issue_id, winner, approval_context.healing_mode, requester)
            .await?;
        self.events.on_resolution_decided(ResolutionDecidedEvent {
            resolution_id: Some(&resolution.resolution_id),
            requires_approval: resolution.requires_approval,
        });
        if matches!(resolution.status, ResolutionStatus::Pending) && !resolution.recommendation_only
        {
            let _: Result<_, _> = resolution.begin_attempt();
            self.dispatch(resolution.clone());
        }
        Ok(SelectionOutcome::Resolution(resolution))
    }

    fn score_candidate<'a>(
        &self,
        candidate: Candidate<'a>,
        approval_context: &ApprovalContext,
    ) -> Scored<'a> {
        let confidence = self.confidence_scorer.score(&candidate.confidence_input);
        let impact = self.impact_analyzer.analyze(&candidate.impact_input);

        let requires_approval = self.approval_manager.requires_approval(&ApprovalPolicy {
            healing_mode: approval_context.healing_mode,
            risk_score: approval_context.risk_score,
            semi_automatic_risk_threshold: approval_context.semi_automatic_risk_threshold,
            confidence: confidence.overall_score,
            confidence_threshold: approval_context.confidence_threshold,
            impact_level: impact.level,
            action_type_override: approval_context.action_type_override,
            business_hours: approval_context.business_hours,
            business_hours_require_approval: approval_context.business_hours_require_approval,
        });

        let priority_score = confidence.overall_score - impact.overall;

        Scored {
            action_id: candidate.action_id,
            action_type: candidate.action_type,
            action_details: candidate.action_details,
            confidence,
            impact,
            requires_approval,
            priority_score,
        }
    }

    async fn build_resolution(
        &self,
        issue_id: IssueId,
        winner: Scored<'_>,
        healing_mode: HealingMode,
        requester: &str,
    ) -> Result<Resolution, sentinel_core::RepositoryError> {
        let mut resolution = Resolution {
            resolution_id: ResolutionId::generate(),
            issue_id,
            action_id: winner.action_id,
            action_type: winner.action_type.to_string(),
            action_details: winner.action_details,
            status: ResolutionStatus::Pending,
            confidence_score: winner.confidence,
            impact_analysis: winner.impact,
            requires_approval: false,
            approval_id: None,
            approval_status: None,
            attempt_count: 0,
            max_attempts: self.max_attempts,
            recommendation_only: healing_mode == HealingMode::RecommendationOnly,
            executed_at: None,
            execution_result: None,
        };

        if winner.requires_approval && !resolution.recommendation_only {
            let request = self
                .approval_manager
                .request(
                    resolution.action_id.clone(),
                    resolution.action_type.clone(),
                    resolution.issue_id.clone(),
                    format!(
                        "resolution {} for issue {}",
                        resolution.resolution_id, resolution.issue_id
                    ),
                    resolution.action_details.clone(),
                    resolution.confidence_score.overall_score,
                    resolution.impact_analysis.overall,
                    resolution.impact_analysis.level,
                    requester,
                    Context::new(),
                )
                .await?;
            let _: Result<_, _> = resolution.require_approval(request.request_id);
        }

        Ok(resolution)
    }

    /// Fire-and-forget dispatch to the injected executor; per spec §4.9 the
    /// selector never awaits execution to completion. Failures are the
    /// executor's own concern — the resolution's `PENDING → IN_PROGRESS →
    /// {SUCCESS, FAILED}` transitions are driven by whoever owns the
    /// dispatched task observing the executor's result, not by this method.
    fn dispatch(&self, resolution: Resolution) {
        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            let details = resolution
                .action_details
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<serde_json::Map<_, _>>();
            let _: Result<(bool, serde_json::Value), ExecutionError> =
                executor.execute(&resolution.action_id, &resolution.action_type, &details).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sentinel_core::ApprovalRepository;
    use sentinel_core::RepositoryError;
    use sentinel_core::RequestId;
    use sentinel_core::clock::Clock;
    use time::OffsetDateTime;

    use super::*;
    use crate::confidence::ContextualFactors;
    use crate::impact::ActionBaseImpact;
    use crate::impact::AddLevel;
    use crate::impact::AddTable;
    use crate::impact::BusinessImpactInput;
    use crate::impact::DataImpactInput;
    use crate::impact::ImpactWeights;
    use crate::impact::PipelineImpactInput;
    use crate::impact::ResourceImpactInput;
    use crate::telemetry::NoopEventSink;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    #[derive(Default)]
    struct NoopApprovalRepository;

    #[async_trait]
    impl ApprovalRepository for NoopApprovalRepository {
        async fn add(
            &self,
            request: sentinel_core::ApprovalRequest,
        ) -> Result<sentinel_core::ApprovalRequest, RepositoryError> {
            Ok(request)
        }
        async fn get(
            &self,
            request_id: &RequestId,
        ) -> Result<sentinel_core::ApprovalRequest, RepositoryError> {
            Err(RepositoryError::NotFound(request_id.to_string()))
        }
        async fn update(
            &self,
            request: sentinel_core::ApprovalRequest,
        ) -> Result<sentinel_core::ApprovalRequest, RepositoryError> {
            Ok(request)
        }
        async fn query_by_status(
            &self,
            _status: sentinel_core::ApprovalStatus,
        ) -> Result<Vec<sentinel_core::ApprovalRequest>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn batch_update(
            &self,
            requests: Vec<sentinel_core::ApprovalRequest>,
        ) -> Result<Vec<sentinel_core::ApprovalRequest>, RepositoryError> {
            Ok(requests)
        }
    }

    struct AlwaysSucceedsExecutor;

    #[async_trait]
    impl HealingExecutor for AlwaysSucceedsExecutor {
        async fn execute(
            &self,
            _action_id: &ActionId,
            _action_type: &str,
            _action_details: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<(bool, serde_json::Value), ExecutionError> {
            Ok((true, serde_json::Value::Null))
        }
    }

    fn selector() -> ResolutionSelector {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(OffsetDateTime::UNIX_EPOCH));
        let approval_manager = Arc::new(ApprovalManager::new(
            Arc::new(NoopApprovalRepository),
            clock,
            Arc::new(NoopEventSink),
            crate::approval::DEFAULT_TTL_HOURS,
        ));
        let mut base_impact = ActionBaseImpact::default();
        base_impact.set("restart_service", 0.05);
        ResolutionSelector::new(
            ConfidenceScorer::default(),
            ImpactAnalyzer::new(ImpactWeights::default(), base_impact, AddTable::default()),
            approval_manager,
            Arc::new(AlwaysSucceedsExecutor),
            Arc::new(NoopEventSink),
            DEFAULT_MAX_ATTEMPTS,
        )
    }

    fn zero_impact_input<'a>(action_type: &'a str) -> ImpactInput<'a> {
        ImpactInput {
            action_type,
            data: DataImpactInput {
                volume: 0.0,
                criticality: AddLevel::Low,
                visibility: AddLevel::Low,
            },
            pipeline: PipelineImpactInput {
                execution_time: AddLevel::Low,
                dep_count: 0,
                pipeline_criticality: AddLevel::Low,
            },
            business: BusinessImpactInput {
                criticality_base: 0.0,
                approaching_sla: false,
                visibility: AddLevel::Low,
                affects_reporting: false,
            },
            resource: ResourceImpactInput {
                compute: AddLevel::Low,
                storage: AddLevel::Low,
                cost: AddLevel::Low,
                scale_factor: 1.0,
            },
        }
    }

    fn strong_confidence_input<'a>() -> ScoringInput<'a> {
        ScoringInput {
            history: &[],
            pattern: None,
            data_levels: &[],
            contextual: Box::leak(Box::new(ContextualFactors {
                business_hours: true,
                environment: "prod".to_string(),
                maintenance_window: false,
            })),
        }
    }

    fn approval_context(healing_mode: HealingMode) -> ApprovalContext {
        ApprovalContext {
            healing_mode,
            risk_score: 0.1,
            semi_automatic_risk_threshold: 0.5,
            confidence_threshold: 0.4,
            action_type_override: None,
            business_hours: true,
            business_hours_require_approval: false,
        }
    }

    #[tokio::test]
    async fn disabled_mode_returns_no_resolution() {
        let selector = selector();
        let candidates = vec![Candidate {
            action_id: ActionId::generate(),
            action_type: "restart_service",
            action_details: Context::new(),
            confidence_input: strong_confidence_input(),
            impact_input: zero_impact_input("restart_service"),
        }];
        let outcome = selector
            .select(
                IssueId::generate(),
                candidates,
                SelectionThresholds { min_confidence: 0.0, max_impact: 1.0 },
                approval_context(HealingMode::Disabled),
                "tester",
            )
            .await
            .unwrap();
        assert!(matches!(outcome, SelectionOutcome::Disabled));
    }

    #[tokio::test]
    async fn automatic_mode_with_low_risk_dispatches_without_approval() {
        let selector = selector();
        let candidates = vec![Candidate {
            action_id: ActionId::generate(),
            action_type: "restart_service",
            action_details: Context::new(),
            confidence_input: strong_confidence_input(),
            impact_input: zero_impact_input("restart_service"),
        }];
        let outcome = selector
            .select(
                IssueId::generate(),
                candidates,
                SelectionThresholds { min_confidence: 0.0, max_impact: 1.0 },
                approval_context(HealingMode::Automatic),
                "tester",
            )
            .await
            .unwrap();
        let SelectionOutcome::Resolution(resolution) = outcome else {
            panic!("expected a resolution")
        };
        assert_eq!(resolution.status, ResolutionStatus::InProgress);
        assert_eq!(resolution.attempt_count, 1);
        assert!(!resolution.requires_approval);
    }

    #[tokio::test]
    async fn no_candidate_clears_thresholds_yields_no_candidate() {
        let selector = selector();
        let candidates = vec![Candidate {
            action_id: ActionId::generate(),
            action_type: "restart_service",
            action_details: Context::new(),
            confidence_input: strong_confidence_input(),
            impact_input: zero_impact_input("restart_service"),
        }];
        let outcome = selector
            .select(
                IssueId::generate(),
                candidates,
                SelectionThresholds { min_confidence: 1.1, max_impact: 1.0 },
                approval_context(HealingMode::Automatic),
                "tester",
            )
            .await
            .unwrap();
        assert!(matches!(outcome, SelectionOutcome::NoCandidate));
    }

    #[tokio::test]
    async fn recommendation_only_mode_never_dispatches() {
        let selector = selector();
        let candidates = vec![Candidate {
            action_id: ActionId::generate(),
            action_type: "restart_service",
            action_details: Context::new(),
            confidence_input: strong_confidence_input(),
            impact_input: zero_impact_input("restart_service"),
        }];
        let outcome = selector
            .select(
                IssueId::generate(),
                candidates,
                SelectionThresholds { min_confidence: 0.0, max_impact: 1.0 },
                approval_context(HealingMode::RecommendationOnly),
                "tester",
            )
            .await
            .unwrap();
        let SelectionOutcome::Resolution(resolution) = outcome else {
            panic!("expected a resolution")
        };
        assert!(resolution.recommendation_only);
        assert_eq!(resolution.status, ResolutionStatus::Pending);
    }
}
