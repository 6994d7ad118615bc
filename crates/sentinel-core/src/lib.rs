// crates/sentinel-core/src/lib.rs
// ============================================================================
// Crate: sentinel-core
// Description: Shared data model, identifiers, and interface traits.
// Purpose: Give every other Sentinel crate a single, dependency-light vocabulary.
// Dependencies: serde, serde_json, thiserror, time, uuid, async-trait
// ============================================================================

//! # sentinel-core
//!
//! The data model and interface traits shared by `sentinel-rules`,
//! `sentinel-engine`, `sentinel-broker`, `sentinel-store-sqlite`,
//! `sentinel-providers`, and `sentinel-cli`. This crate has no awareness of
//! SQLite, HTTP, or SMTP — it defines *what* a repository or transport must
//! do, not how.

pub mod clock;
pub mod ids;
pub mod interfaces;
pub mod model;

pub use clock::Clock;
pub use ids::ActionId;
pub use ids::AlertId;
pub use ids::ExecutionId;
pub use ids::GroupId;
pub use ids::IssueId;
pub use ids::RequestId;
pub use ids::ResolutionId;
pub use ids::RuleId;
pub use interfaces::AlertRepository;
pub use interfaces::AnomalyDetector;
pub use interfaces::ApprovalRepository;
pub use interfaces::DeliveryOutcome;
pub use interfaces::EmailTransport;
pub use interfaces::ExecutionError;
pub use interfaces::HealingExecutor;
pub use interfaces::RepositoryError;
pub use interfaces::TeamsTransport;
pub use interfaces::TimeRange;
pub use interfaces::TransportError;
pub use model::AcknowledgmentDetails;
pub use model::Alert;
pub use model::AlertGroup;
pub use model::AlertStatus;
pub use model::AlertTransitionError;
pub use model::ApprovalRequest;
pub use model::ApprovalStatus;
pub use model::ApprovalTransitionError;
pub use model::Channel;
pub use model::ComparisonOperator;
pub use model::CompoundOperator;
pub use model::ConfidenceScore;
pub use model::Context;
pub use model::EscalationState;
pub use model::HealingMode;
pub use model::ImpactAnalysis;
pub use model::ImpactLevel;
pub use model::MatchType;
pub use model::NotificationAttempt;
pub use model::PropertyCondition;
pub use model::Resolution;
pub use model::ResolutionDetails;
pub use model::ResolutionStatus;
pub use model::ResolutionTransitionError;
pub use model::Rule;
pub use model::RuleConditions;
pub use model::RuleEvaluationResult;
pub use model::RuleType;
pub use model::Severity;
pub use model::SuppressionPolicySnapshot;
pub use model::TrendDirection;
pub use model::TrendType;
