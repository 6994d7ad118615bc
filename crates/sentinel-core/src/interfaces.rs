// crates/sentinel-core/src/interfaces.rs
// ============================================================================
// Module: External Interfaces
// Description: Traits the engine depends on but does not implement.
// Purpose: Let storage, transport, and detection backends vary independently of the engine.
// Dependencies: crate::ids, crate::model, time
// ============================================================================

//! ## Overview
//! Concrete implementations live in `sentinel-store-sqlite` and
//! `sentinel-providers`. Keeping the traits here (rather than alongside their
//! implementations) lets `sentinel-engine`, `sentinel-broker`, and
//! `sentinel-rules` depend on `sentinel-core` alone, never on a storage or
//! transport crate directly.

use time::OffsetDateTime;

use crate::ids::ActionId;
use crate::ids::AlertId;
use crate::ids::ExecutionId;
use crate::ids::RequestId;
use crate::model::Alert;
use crate::model::AlertStatus;
use crate::model::ApprovalRequest;
use crate::model::ApprovalStatus;
use crate::model::NotificationAttempt;
use crate::model::Severity;

/// Errors surfaced by an [`AlertRepository`] or [`ApprovalRepository`]
/// implementation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No record exists with the given identifier.
    #[error("no record found for id {0}")]
    NotFound(String),
    /// The backend rejected the write (constraint violation, serialization
    /// failure, and so on).
    #[error("storage backend rejected the operation: {0}")]
    Backend(String),
    /// The backend could not be reached at all.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A time-range filter shared by several repository queries.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub from: OffsetDateTime,
    /// Inclusive upper bound.
    pub to: OffsetDateTime,
}

/// Persists and queries [`Alert`] records.
///
/// Implemented by `sentinel-store-sqlite::SqliteAlertRepository`.
#[async_trait::async_trait]
pub trait AlertRepository: Send + Sync {
    /// Persists a new alert.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] if the write is rejected.
    async fn create(&self, alert: Alert) -> Result<Alert, RepositoryError>;

    /// Persists a batch of new alerts in one call, so a correlation pass
    /// that opens several alerts at once performs one round trip.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] if the write is rejected.
    async fn batch_create(&self, alerts: Vec<Alert>) -> Result<Vec<Alert>, RepositoryError>;

    /// Fetches one alert by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no such alert exists.
    async fn get(&self, alert_id: &AlertId) -> Result<Alert, RepositoryError>;

    /// Persists an updated alert (status transition, notification append, ...).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the alert no longer exists,
    /// or [`RepositoryError::Backend`] if the write is rejected.
    async fn update(&self, alert: Alert) -> Result<Alert, RepositoryError>;

    /// Lists alerts in the given status.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn query_by_status(&self, status: AlertStatus) -> Result<Vec<Alert>, RepositoryError>;

    /// Lists alerts at or above the given severity.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn query_by_severity(&self, minimum: Severity) -> Result<Vec<Alert>, RepositoryError>;

    /// Lists alerts raised by the given component.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn query_by_component(&self, component: &str) -> Result<Vec<Alert>, RepositoryError>;

    /// Lists alerts tied to the given pipeline execution.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn query_by_execution_id(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<Vec<Alert>, RepositoryError>;

    /// Lists alerts created within the given time range.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn query_by_time_range(&self, range: TimeRange) -> Result<Vec<Alert>, RepositoryError>;

    /// Lists alerts that are not `SUPPRESSED` (i.e. `NEW`, `ACKNOWLEDGED`; a
    /// `RESOLVED` alert is excluded too, since "active" means still
    /// outstanding).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn get_active_alerts(&self) -> Result<Vec<Alert>, RepositoryError>;

    /// Counts alerts matching the given status, for windowed-counter
    /// bookkeeping in the Generator.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn count_by_status(&self, status: AlertStatus) -> Result<u64, RepositoryError>;

    /// Appends a delivery attempt to an alert's notification history.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the alert no longer exists.
    async fn add_notification(
        &self,
        alert_id: &AlertId,
        attempt: NotificationAttempt,
    ) -> Result<(), RepositoryError>;

    /// Deletes alerts older than `cutoff`, returning the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a deletion failure.
    async fn delete_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepositoryError>;
}

/// Persists and queries [`ApprovalRequest`] records.
///
/// Implemented by `sentinel-store-sqlite::SqliteApprovalRepository`.
#[async_trait::async_trait]
pub trait ApprovalRepository: Send + Sync {
    /// Persists a new approval request.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] if the write is rejected.
    async fn add(&self, request: ApprovalRequest) -> Result<ApprovalRequest, RepositoryError>;

    /// Fetches one approval request by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no such request exists.
    async fn get(&self, request_id: &RequestId) -> Result<ApprovalRequest, RepositoryError>;

    /// Persists an updated approval request.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the request no longer exists.
    async fn update(&self, request: ApprovalRequest) -> Result<ApprovalRequest, RepositoryError>;

    /// Lists approval requests in the given status, for the expiry sweep
    /// and for operator-facing listings.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] on a query failure.
    async fn query_by_status(
        &self,
        status: ApprovalStatus,
    ) -> Result<Vec<ApprovalRequest>, RepositoryError>;

    /// Applies the same update to every request in `requests`, used by the
    /// expiry sweep to persist a batch of lazily-expired requests in one
    /// round trip.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Backend`] if any write is rejected.
    async fn batch_update(
        &self,
        requests: Vec<ApprovalRequest>,
    ) -> Result<Vec<ApprovalRequest>, RepositoryError>;
}

/// Outcome of a single notification delivery attempt.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// Whether the transport reported success.
    pub success: bool,
    /// Free-form details (error message, transport message id, ...).
    pub details: serde_json::Value,
}

/// Errors a notification transport may report.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The recipient address/identifier was not understood by this transport.
    #[error("invalid recipient {0:?}")]
    InvalidRecipient(String),
    /// The transport's deadline elapsed before a response was received.
    #[error("delivery timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// The remote endpoint rejected the delivery.
    #[error("remote endpoint rejected delivery: {0}")]
    Rejected(String),
}

/// Delivers a notification over Microsoft Teams (or a compatible webhook).
///
/// Implemented by `sentinel-providers::TeamsWebhookTransport`.
#[async_trait::async_trait]
pub trait TeamsTransport: Send + Sync {
    /// Sends `message` to `webhook_url`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] variant describing why delivery failed.
    async fn send(
        &self,
        webhook_url: &str,
        message: &str,
    ) -> Result<DeliveryOutcome, TransportError>;
}

/// Delivers a notification over SMTP email.
///
/// Implemented by `sentinel-providers::SmtpEmailTransport`.
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// Sends an email with `subject`/`body` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] variant describing why delivery failed.
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<DeliveryOutcome, TransportError>;
}

/// Decides whether a numeric series contains an anomalous final point.
///
/// Implemented by `sentinel-providers::ZScoreAnomalyDetector`.
pub trait AnomalyDetector: Send + Sync {
    /// Returns whether `series`'s most recent point is anomalous under
    /// `algorithm` at the given `sensitivity`, for diagnostic attribution in
    /// `RuleEvaluationResult::details`.
    fn detect_anomaly(
        &self,
        series: &[f64],
        algorithm: &str,
        sensitivity: f64,
        metric_name: &str,
    ) -> bool;
}

/// Executes a chosen healing [`crate::model::Resolution`] against the live
/// system.
///
/// Implemented by `sentinel-providers::ShellHealingExecutor` (or an
/// environment-specific equivalent).
#[async_trait::async_trait]
pub trait HealingExecutor: Send + Sync {
    /// Executes the action identified by `action_id` with `action_details`,
    /// returning whether it succeeded and any free-form result payload.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] describing why the action could not be
    /// run at all (as distinct from running and failing, which is reported
    /// via the returned `bool`).
    async fn execute(
        &self,
        action_id: &ActionId,
        action_type: &str,
        action_details: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(bool, serde_json::Value), ExecutionError>;
}

/// Errors a [`HealingExecutor`] may report.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// No executor is registered for the given action type.
    #[error("no executor registered for action type {0:?}")]
    UnknownActionType(String),
    /// The executor's deadline elapsed before the action completed.
    #[error("execution timed out after {0:?}")]
    Timeout(std::time::Duration),
    /// The executor could not run the action at all (distinct from the
    /// action running and reporting failure).
    #[error("executor failed to run action: {0}")]
    Unavailable(String),
}
