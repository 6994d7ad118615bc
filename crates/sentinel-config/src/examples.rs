// crates/sentinel-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example kept in sync with schema and validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A canonical example `sentinel.toml`, exercised by [`schema`](crate::schema)
//! tests so it can never silently drift from what [`config`](crate::config)
//! actually accepts.

/// Returns a canonical example `sentinel.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[self_healing]
mode = "semi_automatic"
confidence_threshold = 0.85
max_retry_attempts = 3
approval_expiration_hours = 24
critical_impact_threshold = 0.8

[self_healing.impact_weights]
data = 0.4
pipeline = 0.3
business = 0.2
resource = 0.1

[self_healing.impact_thresholds]
medium = 0.3
high = 0.6
critical = 0.8

[[self_healing.action_base_impact]]
action_type = "restart_service"
base = 0.05

[[self_healing.action_type_overrides]]
action_type = "drop_partition"
override = "always"

[notifications.channels.teams]
webhook_url = "https://outlook.office.com/webhook/example"

[notifications.channels.email]
relay_host = "smtp.example.com"
username = "alerts"
password = "changeme"
from = "alerts@example.com"

[[notifications.routing_rules]]
channels = ["TEAMS", "EMAIL"]
[[notifications.routing_rules.conditions]]
type = "severity"
severity = "CRITICAL"

notifications.max_concurrent_notifications = 10
notifications.history_retention_hours = 24

[[alerting.rules]]
rule_id = "ingest-lag-threshold"
name = "Ingest lag threshold"
description = "Fires when ingest lag exceeds the configured ceiling."
severity = "HIGH"
enabled = true
actions = ["restart_service"]

[alerting.rules.conditions]
rule_type = "Threshold"
metric_path = "ingest.lag_seconds"
operator = "gt"
value = 300

alerting.max_concurrent_alerts = 10

[escalation]
check_interval_seconds = 60

[[escalation.escalation_policies]]
severity = "CRITICAL"
levels = [1, 2, 3]
timeframes = [
    { level = 1, minutes = 15 },
    { level = 2, minutes = 30 },
    { level = 3, minutes = 60 },
]

[[escalation.escalation_targets]]
level = 1
severity = "CRITICAL"
teams_webhook_url = "https://outlook.office.com/webhook/oncall"
"#,
    )
}
