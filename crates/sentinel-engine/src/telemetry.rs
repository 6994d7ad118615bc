// crates/sentinel-engine/src/telemetry.rs
// ============================================================================
// Module: Engine Telemetry
// Description: Observability hooks for alerting/self-healing decision events.
// Purpose: Let every component report what it decided without a hard logging dependency.
// Dependencies: sentinel_core::ids
// ============================================================================

//! ## Overview
//! Dependency-light event sink, mirroring `decision-gate-mcp`'s telemetry
//! module: a small trait with one method per class of decision, a
//! `NoopEventSink` for tests, and a `StderrEventSink` that writes
//! structured single-line `key=value` records. Every component takes an
//! `Arc<dyn EventSink>` at construction instead of reading a global logger.

use sentinel_core::AlertId;
use sentinel_core::RequestId;
use sentinel_core::ResolutionId;
use sentinel_core::RuleId;

/// One alert was created, and whether it was suppressed on arrival.
#[derive(Debug, Clone, Copy)]
pub struct AlertCreatedEvent<'a> {
    /// The new alert's id.
    pub alert_id: &'a AlertId,
    /// The rule that raised it, if any (direct-generated alerts have none).
    pub rule_id: Option<&'a RuleId>,
    /// Whether the correlator suppressed it.
    pub suppressed: bool,
}

/// One notification dispatch completed for one channel.
#[derive(Debug, Clone, Copy)]
pub struct NotificationDispatchedEvent<'a> {
    /// The alert the notification concerns.
    pub alert_id: &'a AlertId,
    /// Channel label (`"TEAMS"`, `"EMAIL"`, ...).
    pub channel: &'a str,
    /// Whether delivery succeeded.
    pub success: bool,
}

/// The Escalation Manager advanced an alert to a new level.
#[derive(Debug, Clone, Copy)]
pub struct EscalationEvent<'a> {
    /// The alert that was escalated.
    pub alert_id: &'a AlertId,
    /// The level it was escalated to.
    pub level: u32,
}

/// The Resolution Selector decided on (or declined) an action.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionDecidedEvent<'a> {
    /// The resolution, if one was created.
    pub resolution_id: Option<&'a ResolutionId>,
    /// Whether it requires manual approval.
    pub requires_approval: bool,
}

/// The Approval Manager decided (or lazily expired) a request.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalDecidedEvent<'a> {
    /// The request that was decided.
    pub request_id: &'a RequestId,
    /// Outcome label (`"APPROVED"`, `"REJECTED"`, `"EXPIRED"`).
    pub outcome: &'a str,
}

/// Observability sink for the decision core's components.
///
/// Implementations must not block the caller for long or propagate a panic;
/// telemetry failures must never affect a decision outcome.
pub trait EventSink: Send + Sync {
    /// An alert was created (possibly suppressed).
    fn on_alert_created(&self, event: AlertCreatedEvent<'_>);
    /// A notification was dispatched on one channel.
    fn on_notification_dispatched(&self, event: NotificationDispatchedEvent<'_>);
    /// An alert was escalated to a new level.
    fn on_escalation(&self, event: EscalationEvent<'_>);
    /// A resolution was decided (or declined).
    fn on_resolution_decided(&self, event: ResolutionDecidedEvent<'_>);
    /// An approval request was decided.
    fn on_approval_decided(&self, event: ApprovalDecidedEvent<'_>);
}

/// An [`EventSink`] that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn on_alert_created(&self, _event: AlertCreatedEvent<'_>) {}
    fn on_notification_dispatched(&self, _event: NotificationDispatchedEvent<'_>) {}
    fn on_escalation(&self, _event: EscalationEvent<'_>) {}
    fn on_resolution_decided(&self, _event: ResolutionDecidedEvent<'_>) {}
    fn on_approval_decided(&self, _event: ApprovalDecidedEvent<'_>) {}
}

/// An [`EventSink`] that writes one structured `key=value` line per event to
/// stderr, for local development and container log collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    #[allow(clippy::print_stderr, reason = "dependency-light sink; see module doc")]
    fn on_alert_created(&self, event: AlertCreatedEvent<'_>) {
        eprintln!(
            "event=alert_created alert_id={} rule_id={} suppressed={}",
            event.alert_id,
            event.rule_id.map_or_else(|| "-".to_string(), ToString::to_string),
            event.suppressed
        );
    }

    #[allow(clippy::print_stderr, reason = "dependency-light sink; see module doc")]
    fn on_notification_dispatched(&self, event: NotificationDispatchedEvent<'_>) {
        eprintln!(
            "event=notification_dispatched alert_id={} channel={} success={}",
            event.alert_id, event.channel, event.success
        );
    }

    #[allow(clippy::print_stderr, reason = "dependency-light sink; see module doc")]
    fn on_escalation(&self, event: EscalationEvent<'_>) {
        eprintln!("event=escalation alert_id={} level={}", event.alert_id, event.level);
    }

    #[allow(clippy::print_stderr, reason = "dependency-light sink; see module doc")]
    fn on_resolution_decided(&self, event: ResolutionDecidedEvent<'_>) {
        eprintln!(
            "event=resolution_decided resolution_id={} requires_approval={}",
            event.resolution_id.map_or_else(|| "-".to_string(), ToString::to_string),
            event.requires_approval
        );
    }

    #[allow(clippy::print_stderr, reason = "dependency-light sink; see module doc")]
    fn on_approval_decided(&self, event: ApprovalDecidedEvent<'_>) {
        eprintln!(
            "event=approval_decided request_id={} outcome={}",
            event.request_id, event.outcome
        );
    }
}
