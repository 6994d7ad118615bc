// crates/sentinel-engine/src/correlator.rs
// ============================================================================
// Module: Alert Correlator (C2)
// Description: Groups related alerts and decides duplicate/rate-limit suppression.
// Purpose: Keep noisy repeated alerts from flooding notification channels.
// Dependencies: sentinel_core::{model, Clock}
// ============================================================================

//! ## Overview
//! For each new alert, [`AlertCorrelator::correlate`] performs the two-phase
//! decision from the spec: (a) assign to an existing open group sharing a
//! correlation key, else open a new one; (b) decide suppression. Expired
//! groups are pruned lazily, the same pattern `ApprovalRequest::apply_lazy_expiry`
//! uses for expiry — state is swept on the read path rather than by a
//! separate timer.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::RwLock;

use time::Duration as TimeDuration;
use time::OffsetDateTime;

use sentinel_core::Alert;
use sentinel_core::AlertId;
use sentinel_core::AlertStatus;
use sentinel_core::Clock;
use sentinel_core::GroupId;
use sentinel_core::SuppressionPolicySnapshot;

/// Correlation window and group lifetime. Deliberately has no `Default`:
/// every deployment must state these explicitly (see `DESIGN.md`, resolved
/// Open Question on correlation window/TTL configuration).
#[derive(Debug, Clone, Copy)]
pub struct CorrelationPolicy {
    /// How long a shared `component` counts as "the same incident".
    pub correlation_window_secs: u64,
    /// How long an open group stays eligible for new members before it's
    /// considered stale and a fresh group is opened instead.
    pub group_ttl_secs: u64,
}

/// Rate-limit threshold for one `(alert_type, component)` pair. No
/// `Default`: N and W must be configured per alert type, per the spec.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Maximum alerts allowed within `window_secs`.
    pub count: u32,
    /// Sliding window, in seconds.
    pub window_secs: u64,
}

/// Outcome of correlating one candidate alert.
#[derive(Debug, Clone)]
pub struct CorrelationOutcome {
    /// The group the alert was assigned to (existing or newly opened).
    pub group_id: GroupId,
    /// Whether the alert should be suppressed (not routed).
    pub suppressed: bool,
    /// Reason recorded in `Alert::context["suppression"]` when suppressed.
    pub suppression_reason: Option<String>,
    /// The group's current primary, whose `related_alerts` the caller
    /// should append `alert.alert_id` to when `suppressed` is true.
    pub primary_alert_id: AlertId,
}

/// An open group plus the matching fields tracked from its most recent
/// member, used to decide whether the next candidate alert belongs to it.
struct GroupEntry {
    /// The durable group record handed back to callers.
    group: sentinel_core::AlertGroup,
    /// Current lifecycle status of the group's primary alert.
    primary_status: AlertStatus,
    /// `alert_type` of the most recently added member.
    last_alert_type: String,
    /// `component` of the most recently added member.
    last_component: Option<String>,
    /// `execution_id` of the most recently added member.
    last_execution_id: Option<String>,
    /// Context entries of the most recently added member, for overlap checks.
    last_context_keys: Vec<(String, serde_json::Value)>,
    /// When the most recent member was added.
    last_seen: OffsetDateTime,
}

/// Tracks open alert groups and per-`(alert_type, component)` rate-limit
/// windows. Owned by the Generator; one instance per process.
pub struct AlertCorrelator {
    clock: Arc<dyn Clock>,
    default_policy: CorrelationPolicy,
    rate_limits: HashMap<String, RateLimitPolicy>,
    groups: RwLock<HashMap<GroupId, GroupEntry>>,
    rate_state: RwLock<HashMap<(String, String), VecDeque<OffsetDateTime>>>,
}

impl AlertCorrelator {
    /// Creates a correlator with the given default correlation policy and
    /// per-`alert_type` rate-limit overrides.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        default_policy: CorrelationPolicy,
        rate_limits: HashMap<String, RateLimitPolicy>,
    ) -> Self {
        Self {
            clock,
            default_policy,
            rate_limits,
            groups: RwLock::new(HashMap::new()),
            rate_state: RwLock::new(HashMap::new()),
        }
    }

    /// Correlates `alert` against the open group set, mutating internal
    /// state (assigns to or opens a group, records rate-limit arrival) and
    /// returning the suppression decision. Never suppresses on an internal
    /// error — "a correlator/suppression exception must default to *do not
    /// suppress*" is upheld structurally here since nothing in this path can
    /// fail; callers wrapping a fallible extension point should honor the
    /// same default. A poisoned internal lock also falls through to opening
    /// a fresh, unsuppressed group rather than propagating the poison.
    pub fn correlate(&self, alert: &Alert) -> CorrelationOutcome {
        let now = self.clock.now();
        self.evict_expired_groups(now);

        if let Some(outcome) = self.match_existing_group(alert, now) {
            return outcome;
        }

        self.open_new_group(alert, now)
    }

    /// Drops groups whose TTL has elapsed relative to `now`.
    fn evict_expired_groups(&self, now: OffsetDateTime) {
        let Ok(mut groups) = self.groups.write() else { return };
        groups.retain(|_, entry| {
            let ttl = TimeDuration::seconds(
                i64::try_from(entry.group.policy.group_ttl_secs).unwrap_or(i64::MAX),
            );
            entry.last_seen + ttl > now
        });
    }

    /// Assigns `alert` to an open group sharing a correlation key, if any.
    fn match_existing_group(
        &self,
        alert: &Alert,
        now: OffsetDateTime,
    ) -> Option<CorrelationOutcome> {
        let Ok(mut groups) = self.groups.write() else { return None };
        let window = TimeDuration::seconds(
            i64::try_from(self.default_policy.correlation_window_secs).unwrap_or(i64::MAX),
        );

        let matched_id = groups.iter().find_map(|(group_id, entry)| {
            let execution_match = alert
                .execution_id
                .as_ref()
                .map(ToString::to_string)
                .is_some_and(|exec_id| {
                    entry.last_execution_id.as_deref() == Some(exec_id.as_str())
                });
            let component_match = alert.component.is_some()
                && entry.last_component == alert.component
                && now - entry.last_seen <= window;
            let context_overlap = alert.alert_type == entry.last_alert_type
                && alert.context.iter().any(|(key, value)| {
                    entry.last_context_keys.iter().any(|(other_key, other_value)| {
                        other_key == key && other_value == value
                    })
                });
            (execution_match || component_match || context_overlap).then(|| group_id.clone())
        })?;

        let entry = groups.get_mut(&matched_id)?;
        entry.group.members.push(alert.alert_id.clone());
        entry.last_alert_type = alert.alert_type.clone();
        entry.last_component = alert.component.clone();
        entry.last_execution_id = alert.execution_id.as_ref().map(ToString::to_string);
        entry.last_context_keys =
            alert.context.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entry.last_seen = now;

        let primary_open =
            matches!(entry.primary_status, AlertStatus::New | AlertStatus::Acknowledged);
        Some(CorrelationOutcome {
            group_id: matched_id,
            suppressed: primary_open,
            suppression_reason: primary_open.then(|| "duplicate_of_open_group".to_string()),
            primary_alert_id: entry.group.primary_alert_id.clone(),
        })
    }

    /// Opens a fresh group with `alert` as its sole member and primary.
    fn open_new_group(&self, alert: &Alert, now: OffsetDateTime) -> CorrelationOutcome {
        let group_id = GroupId::generate();
        let policy_snapshot = SuppressionPolicySnapshot {
            correlation_window_secs: self.default_policy.correlation_window_secs,
            rate_limit_count: self.rate_limits.get(&alert.alert_type).map(|policy| policy.count),
            rate_limit_window_secs: self
                .rate_limits
                .get(&alert.alert_type)
                .map(|policy| policy.window_secs),
            group_ttl_secs: self.default_policy.group_ttl_secs,
        };

        let group = sentinel_core::AlertGroup {
            group_id: group_id.clone(),
            members: vec![alert.alert_id.clone()],
            primary_alert_id: alert.alert_id.clone(),
            opened_at: now,
            policy: policy_snapshot,
        };

        let entry = GroupEntry {
            group,
            primary_status: AlertStatus::New,
            last_alert_type: alert.alert_type.clone(),
            last_component: alert.component.clone(),
            last_execution_id: alert.execution_id.as_ref().map(ToString::to_string),
            last_context_keys: alert.context.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            last_seen: now,
        };

        if let Ok(mut groups) = self.groups.write() {
            groups.insert(group_id.clone(), entry);
        }

        let rate_limited = self.check_rate_limit(alert, now);

        CorrelationOutcome {
            group_id,
            suppressed: rate_limited,
            suppression_reason: rate_limited.then(|| "rate_limited".to_string()),
            primary_alert_id: alert.alert_id.clone(),
        }
    }

    /// Records `alert`'s arrival in its `(alert_type, component)` sliding
    /// window and reports whether that pushed it over the configured limit.
    fn check_rate_limit(&self, alert: &Alert, now: OffsetDateTime) -> bool {
        let Some(policy) = self.rate_limits.get(&alert.alert_type) else { return false };
        let Some(component) = alert.component.as_ref() else { return false };
        let window = TimeDuration::seconds(i64::try_from(policy.window_secs).unwrap_or(i64::MAX));
        let key = (alert.alert_type.clone(), component.clone());

        let Ok(mut rate_state) = self.rate_state.write() else { return false };
        let timestamps = rate_state.entry(key).or_default();
        while let Some(&oldest) = timestamps.front() {
            if now - oldest > window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        let limit = usize::try_from(policy.count).unwrap_or(usize::MAX);
        let over_limit = timestamps.len() >= limit;
        timestamps.push_back(now);
        over_limit
    }

    /// Marks the group's primary alert status, so future `correlate` calls
    /// know whether new members duplicate-suppress. Called by the Generator
    /// after an acknowledge/resolve transition on the primary.
    pub fn record_primary_status(&self, group_id: &GroupId, status: AlertStatus) {
        let Ok(mut groups) = self.groups.write() else { return };
        if let Some(entry) = groups.get_mut(group_id) {
            entry.primary_status = status;
        }
    }
}
