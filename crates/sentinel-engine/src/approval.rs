// crates/sentinel-engine/src/approval.rs
// ============================================================================
// Module: Approval Manager (C8)
// Description: Decides whether a healing action requires human sign-off and mediates that decision.
// Purpose: Gate risky or low-confidence automation behind an auditable approve/reject/expire
//   record.
// Dependencies: sentinel_core::{ApprovalRequest, ApprovalRepository, HealingMode}
// ============================================================================

//! ## Overview
//! [`ApprovalManager::requires_approval`] implements spec §4.8's
//! policy-combination rule exactly. [`ApprovalManager::request`],
//! [`ApprovalManager::approve`], and [`ApprovalManager::reject`] wrap the
//! transition methods already defined on [`ApprovalRequest`] with
//! persistence. [`ApprovalManager::cleanup_expired_requests`] sweeps every
//! pending request past its `expires_at` in one `batch_update`, per spec.

use std::sync::Arc;

use sentinel_core::ApprovalRepository;
use sentinel_core::ApprovalRequest;
use sentinel_core::ApprovalStatus;
use sentinel_core::ApprovalTransitionError;
use sentinel_core::Clock;
use sentinel_core::Context;
use sentinel_core::HealingMode;
use sentinel_core::ImpactLevel;
use sentinel_core::RepositoryError;
use sentinel_core::RequestId;

use crate::telemetry::ApprovalDecidedEvent;
use crate::telemetry::EventSink;

/// Default time-to-live for a pending approval request (spec §4.8: "default
/// 24 hours, configurable").
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Per-action-type override of the approval requirement, per spec §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTypeOverride {
    /// Always require approval for this action type.
    Always,
    /// Never require approval for this action type.
    Never,
    /// Require only when the computed impact is `HIGH` or `CRITICAL`.
    HighImpactOnly,
    /// Require only when the computed impact is `CRITICAL`.
    CriticalOnly,
}

/// Policy inputs to [`ApprovalManager::requires_approval`].
#[derive(Debug, Clone, Copy)]
pub struct ApprovalPolicy {
    /// Current healing mode.
    pub healing_mode: HealingMode,
    /// Risk score in `[0,1]`, gating `AUTOMATIC` mode.
    pub risk_score: f64,
    /// `SEMI_AUTOMATIC`'s risk ceiling before approval is required.
    pub semi_automatic_risk_threshold: f64,
    /// Confidence score computed for the candidate action.
    pub confidence: f64,
    /// Global confidence threshold below which approval is always required.
    pub confidence_threshold: f64,
    /// Impact bucket computed for the candidate action.
    pub impact_level: ImpactLevel,
    /// Per-action-type override, if configured.
    pub action_type_override: Option<ActionTypeOverride>,
    /// Whether `now` falls within business hours.
    pub business_hours: bool,
    /// Whether the business-hours policy bit requires approval during them.
    pub business_hours_require_approval: bool,
}

/// Decides and mediates approval requirements for candidate healing actions.
pub struct ApprovalManager {
    repository: Arc<dyn ApprovalRepository>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    ttl_hours: i64,
}

impl ApprovalManager {
    /// Builds a manager with the given TTL (spec default
    /// [`DEFAULT_TTL_HOURS`]).
    #[must_use]
    pub fn new(
        repository: Arc<dyn ApprovalRepository>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
        ttl_hours: i64,
    ) -> Self {
        Self { repository, clock, events, ttl_hours }
    }

    /// Whether a candidate action requires manual approval, per spec §4.8's
    /// combination of healing mode, per-action-type override, confidence
    /// threshold, and business-hours policy.
    #[must_use]
    pub fn requires_approval(&self, policy: &ApprovalPolicy) -> bool {
        if let Some(result) =
            policy.action_type_override.map(|rule| action_type_requires(rule, policy.impact_level))
        {
            return result;
        }

        if policy.confidence < policy.confidence_threshold {
            return true;
        }

        if policy.business_hours && policy.business_hours_require_approval {
            return true;
        }

        match policy.healing_mode {
            HealingMode::Disabled | HealingMode::RecommendationOnly => true,
            HealingMode::Automatic => policy.risk_score > 0.8,
            HealingMode::SemiAutomatic => policy.risk_score > policy.semi_automatic_risk_threshold,
        }
    }

    /// Creates and persists a new pending approval request with this
    /// manager's configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if persistence fails.
    #[allow(
        clippy::too_many_arguments,
        reason = "mirrors ApprovalRequest's own field count; a builder would just move the arity, not reduce it"
    )]
    pub async fn request(
        &self,
        action_id: sentinel_core::ActionId,
        action_type: impl Into<String>,
        issue_id: sentinel_core::IssueId,
        issue_description: impl Into<String>,
        action_details: Context,
        confidence_score: f64,
        impact_score: f64,
        impact_level: ImpactLevel,
        requester: impl Into<String>,
        context: Context,
    ) -> Result<ApprovalRequest, RepositoryError> {
        let now = self.clock.now();
        let request = ApprovalRequest {
            request_id: RequestId::generate(),
            action_id,
            action_type: action_type.into(),
            issue_id,
            issue_description: issue_description.into(),
            action_details,
            confidence_score,
            impact_score,
            impact_level,
            status: ApprovalStatus::Pending,
            requester: requester.into(),
            approver: None,
            created_at: now,
            updated_at: now,
            expires_at: now + time::Duration::hours(self.ttl_hours),
            rejection_reason: None,
            context,
        };
        self.repository.add(request).await
    }

    /// Fetches a request, applying lazy expiry before returning it so reads
    /// observe expiry even between sweeps.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the request doesn't exist or
    /// persisting a lazy-expiry transition fails.
    pub async fn get(&self, request_id: &RequestId) -> Result<ApprovalRequest, RepositoryError> {
        let mut request = self.repository.get(request_id).await?;
        if request.apply_lazy_expiry(self.clock.now()) {
            request = self.repository.update(request).await?;
        }
        Ok(request)
    }

    /// Approves a pending request.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if persistence fails. A non-pending
    /// request (including one that just lazily expired) is reported via the
    /// returned request's status, not as an error — callers inspect
    /// `request.status` to distinguish success from a stale decision.
    pub async fn approve(
        &self,
        request_id: &RequestId,
        approver: impl Into<String>,
    ) -> Result<ApprovalRequest, RepositoryError> {
        let mut request = self.repository.get(request_id).await?;
        let now = self.clock.now();
        let outcome: Result<(), ApprovalTransitionError> = request.approve(approver, now);
        let _ = outcome;
        let persisted = self.repository.update(request).await?;
        self.events.on_approval_decided(ApprovalDecidedEvent {
            request_id,
            outcome: approval_outcome_tag(persisted.status),
        });
        Ok(persisted)
    }

    /// Rejects a pending request with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if persistence fails.
    pub async fn reject(
        &self,
        request_id: &RequestId,
        approver: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<ApprovalRequest, RepositoryError> {
        let mut request = self.repository.get(request_id).await?;
        let now = self.clock.now();
        let outcome: Result<(), ApprovalTransitionError> = request.reject(approver, reason, now);
        let _ = outcome;
        let persisted = self.repository.update(request).await?;
        self.events.on_approval_decided(ApprovalDecidedEvent {
            request_id,
            outcome: approval_outcome_tag(persisted.status),
        });
        Ok(persisted)
    }

    /// Sweeps every pending request whose `expires_at` has passed and
    /// persists them as `EXPIRED` in one batch update.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the batch write fails.
    pub async fn cleanup_expired_requests(&self) -> Result<u64, RepositoryError> {
        let now = self.clock.now();
        let pending = self.repository.query_by_status(ApprovalStatus::Pending).await?;
        let expired: Vec<ApprovalRequest> = pending
            .into_iter()
            .filter_map(|mut request| request.apply_lazy_expiry(now).then_some(request))
            .collect();
        if expired.is_empty() {
            return Ok(0);
        }
        let count = expired.len() as u64;
        self.repository.batch_update(expired).await?;
        Ok(count)
    }
}

/// Applies `rule` against `impact_level`, the per-action-type override
/// branch of [`ApprovalManager::requires_approval`].
const fn action_type_requires(rule: ActionTypeOverride, impact_level: ImpactLevel) -> bool {
    match rule {
        ActionTypeOverride::Always => true,
        ActionTypeOverride::Never => false,
        ActionTypeOverride::HighImpactOnly => {
            matches!(impact_level, ImpactLevel::High | ImpactLevel::Critical)
        }
        ActionTypeOverride::CriticalOnly => matches!(impact_level, ImpactLevel::Critical),
    }
}

/// Lowercase wire tag for an [`ApprovalStatus`], used in telemetry events
/// instead of `Debug` formatting.
const fn approval_outcome_tag(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "pending",
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
        ApprovalStatus::Expired => "expired",
    }
}
