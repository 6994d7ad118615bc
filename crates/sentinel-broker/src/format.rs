// crates/sentinel-broker/src/format.rs
// ============================================================================
// Module: Message Formatting
// Description: Builds channel-agnostic notification payloads from an alert.
// Purpose: Let the router own presentation so transports only serialize and send.
// Dependencies: sentinel-core::model
// ============================================================================

//! ## Overview
//! Grounded on `teams_notifier.py::format_teams_card` /
//! `email_notifier.py`'s subject/body builders: both notifiers derive the
//! same severity-driven styling (color, icon, prefix) and the same
//! fact-list-from-context rendering, they just wrap it in a different
//! envelope. [`FormattedMessage`] captures that shared shape once; the
//! router builds it, and each transport renders it into its own wire
//! format.

use std::collections::BTreeMap;

use sentinel_core::AlertId;
use sentinel_core::Severity;
use serde_json::Value;
use time::OffsetDateTime;

/// Severity-derived presentation hints, matching the teacher notifier's
/// per-severity styling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    /// Card accent color keyword (`"attention"`, `"warning"`, `"accent"`,
    /// `"good"`, `"default"`).
    pub color: &'static str,
    /// Short label prepended to the title (`"CRITICAL ALERT"`, `"Info"`, ...).
    pub prefix: &'static str,
}

/// Returns the presentation hints for `severity`.
#[must_use]
pub fn severity_style(severity: Severity) -> SeverityStyle {
    match severity {
        Severity::Critical => SeverityStyle { color: "attention", prefix: "CRITICAL ALERT" },
        Severity::High => SeverityStyle { color: "warning", prefix: "HIGH ALERT" },
        Severity::Medium => SeverityStyle { color: "accent", prefix: "ALERT" },
        Severity::Low => SeverityStyle { color: "good", prefix: "Notification" },
        Severity::Info => SeverityStyle { color: "default", prefix: "Info" },
    }
}

/// A notification rendered into a channel-agnostic shape. Transports map
/// this to their own wire payload (an adaptive card, a MIME email, ...)
/// rather than building presentation themselves.
#[derive(Debug, Clone)]
pub struct FormattedMessage {
    /// Caller- or router-assigned id, used for delivery-history dedup.
    pub notification_id: String,
    /// The alert this notification concerns.
    pub alert_id: AlertId,
    /// Title line, already prefixed with the severity label.
    pub title: String,
    /// Main body text.
    pub body: String,
    /// Presentation hints derived from severity.
    pub style: SeverityStyle,
    /// Context rendered as `(label, value)` facts, in insertion order.
    pub facts: Vec<(String, String)>,
    /// When the message was formatted.
    pub formatted_at: OffsetDateTime,
}

/// Builds a [`FormattedMessage`] from alert fields, the same inputs every
/// channel's card/email builder in the teacher notifier module consumes.
#[must_use]
pub fn format_message(
    notification_id: String,
    alert_id: AlertId,
    title: &str,
    description: &str,
    severity: Severity,
    context: &BTreeMap<String, Value>,
    now: OffsetDateTime,
) -> FormattedMessage {
    let style = severity_style(severity);
    let facts = context
        .iter()
        .map(|(key, value)| (humanize_key(key), stringify_fact(value)))
        .collect();

    FormattedMessage {
        notification_id,
        alert_id,
        title: format!("{}: {title}", style.prefix),
        body: description.to_string(),
        style,
        facts,
        formatted_at: now,
    }
}

/// `pipeline_url` → `Pipeline Url`, matching the teacher notifier's
/// `key.replace('_', ' ').title()`.
fn humanize_key(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn stringify_fact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::AlertId;

    #[test]
    fn critical_severity_gets_attention_prefix() {
        let style = severity_style(Severity::Critical);
        assert_eq!(style.color, "attention");
        assert_eq!(style.prefix, "CRITICAL ALERT");
    }

    #[test]
    fn humanizes_context_keys_into_facts() {
        let mut context = BTreeMap::new();
        context.insert(
            "pipeline_url".to_string(),
            Value::String("https://example.test".to_string()),
        );
        let message = format_message(
            "note-1".to_string(),
            AlertId::new("alert-1"),
            "Pipeline stalled",
            "no rows in 10m",
            Severity::High,
            &context,
            OffsetDateTime::UNIX_EPOCH,
        );
        assert_eq!(
            message.facts,
            vec![("Pipeline Url".to_string(), "https://example.test".to_string())]
        );
        assert_eq!(message.title, "HIGH ALERT: Pipeline stalled");
    }
}
