// crates/sentinel-engine/src/lib.rs
// ============================================================================
// Module: Sentinel Engine Library
// Description: Alert correlation, generation, escalation, and self-healing decision components.
// Purpose: Turn rule evaluations into notified, correlated, escalating, and (mode-permitting)
//   acted-on alerts.
// Dependencies: sentinel-core, sentinel-rules, sentinel-broker, tokio, futures
// ============================================================================

//! ## Overview
//! Sentinel Engine hosts the alerting and self-healing decision components
//! (spec §4.2, §4.4-§4.9): [`correlator`]'s `AlertCorrelator` groups and
//! rate-limits related alerts; [`counters`]'s `AlertCounters` tracks
//! windowed alert volume; [`generator`]'s `AlertGenerator` turns rule
//! evaluations (or direct calls) into persisted, notified alerts;
//! [`escalation`]'s `EscalationManager` is the single background worker
//! that raises unacknowledged alerts over time; [`confidence`]'s
//! `ConfidenceScorer` and [`impact`]'s `ImpactAnalyzer` score candidate
//! healing actions; [`approval`]'s `ApprovalManager` gates risky or
//! low-confidence actions behind human sign-off; [`resolution`]'s
//! `ResolutionSelector` picks the best candidate and hands it to the
//! injected executor. [`telemetry`] is the shared observability seam every
//! component reports decisions through.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod approval;
pub mod confidence;
pub mod correlator;
pub mod counters;
pub mod escalation;
pub mod generator;
pub mod impact;
pub mod resolution;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use approval::ActionTypeOverride;
pub use approval::ApprovalManager;
pub use approval::ApprovalPolicy;
pub use approval::DEFAULT_TTL_HOURS;
pub use confidence::ConfidenceScorer;
pub use confidence::ConfidenceWeights;
pub use confidence::ContextualFactors;
pub use confidence::DEFAULT_MIN_HISTORY_SAMPLES;
pub use confidence::DataCharacteristicTable;
pub use confidence::DataLevel;
pub use confidence::HistoricalOutcome;
pub use confidence::PatternMatch;
pub use confidence::ScoringInput;
pub use confidence::data_level_from_label;
pub use confidence::data_level_from_volume;
pub use correlator::AlertCorrelator;
pub use correlator::CorrelationOutcome;
pub use correlator::CorrelationPolicy;
pub use correlator::RateLimitPolicy;
pub use counters::AlertCounters;
pub use counters::WindowCounts;
pub use escalation::DEFAULT_INTERVAL_SECS;
pub use escalation::EscalationConfig;
pub use escalation::EscalationManager;
pub use escalation::EscalationPolicy;
pub use generator::AlertGenerator;
pub use generator::GeneratorConfig;
pub use generator::GeneratorError;
pub use generator::PER_ALERT_TIMEOUT;
pub use impact::ActionBaseImpact;
pub use impact::AddLevel;
pub use impact::AddTable;
pub use impact::BusinessImpactInput;
pub use impact::DataImpactInput;
pub use impact::ImpactAnalyzer;
pub use impact::ImpactInput;
pub use impact::ImpactWeights;
pub use impact::PipelineImpactInput;
pub use impact::ResourceImpactInput;
pub use resolution::ApprovalContext;
pub use resolution::Candidate;
pub use resolution::DEFAULT_MAX_ATTEMPTS;
pub use resolution::ResolutionSelector;
pub use resolution::SelectionOutcome;
pub use resolution::SelectionThresholds;
pub use telemetry::AlertCreatedEvent;
pub use telemetry::ApprovalDecidedEvent;
pub use telemetry::EscalationEvent;
pub use telemetry::EventSink;
pub use telemetry::NoopEventSink;
pub use telemetry::NotificationDispatchedEvent;
pub use telemetry::ResolutionDecidedEvent;
pub use telemetry::StderrEventSink;
