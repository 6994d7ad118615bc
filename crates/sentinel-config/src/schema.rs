// crates/sentinel-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema builder for sentinel.toml.
// Purpose: Give tooling a validation schema that never drifts from config.rs.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Hand-maintained JSON Schema for `sentinel.toml`, covering every key
//! `SentinelConfig` recognizes (spec §6). Kept deliberately close to
//! `config.rs`'s field order so the two are easy to diff by eye.

use serde_json::Value;
use serde_json::json;

use crate::config::DEFAULT_CHECK_INTERVAL_SECONDS;
use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::config::DEFAULT_CRITICAL_IMPACT_THRESHOLD;
use crate::config::DEFAULT_HISTORY_RETENTION_HOURS;
use crate::config::DEFAULT_MAX_CONCURRENT_ALERTS;
use crate::config::DEFAULT_MAX_CONCURRENT_NOTIFICATIONS;
use crate::config::DEFAULT_MAX_RETRY_ATTEMPTS;

/// Returns the JSON schema for `sentinel.toml`.
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "sentinel://contract/schemas/config.schema.json",
        "title": "Sentinel Decision Core Configuration",
        "description":
            "Configuration for alerting, escalation, notification routing, and self-healing.",
        "type": "object",
        "properties": {
            "self_healing": self_healing_schema(),
            "notifications": notifications_schema(),
            "alerting": alerting_schema(),
            "escalation": escalation_schema(),
        },
        "additionalProperties": false,
    })
}

fn self_healing_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "mode": {
                "type": "string",
                "enum": ["disabled", "recommendation_only", "semi_automatic", "automatic"],
                "default": "disabled",
            },
            "confidence_threshold": {
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
                "default": DEFAULT_CONFIDENCE_THRESHOLD,
            },
            "max_retry_attempts": {
                "type": "integer", "minimum": 1, "default": DEFAULT_MAX_RETRY_ATTEMPTS,
            },
            "approval_expiration_hours": { "type": "integer", "minimum": 1, "default": 24 },
            "impact_weights": {
                "type": "object",
                "properties": {
                    "data": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "pipeline": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "business": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "resource": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                },
                "additionalProperties": false,
            },
            "impact_thresholds": {
                "type": "object",
                "properties": {
                    "medium": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "high": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "critical": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                },
                "additionalProperties": false,
            },
            "critical_impact_threshold": {
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
                "default": DEFAULT_CRITICAL_IMPACT_THRESHOLD,
            },
            "action_base_impact": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "action_type": { "type": "string" },
                        "base": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    },
                    "required": ["action_type", "base"],
                },
            },
            "action_type_overrides": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "action_type": { "type": "string" },
                        "override": {
                            "type": "string",
                            "enum": ["always", "never", "high_impact_only", "critical_only"],
                        },
                    },
                    "required": ["action_type", "override"],
                },
            },
        },
        "additionalProperties": false,
    })
}

fn notifications_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channels": {
                "type": "object",
                "properties": {
                    "teams": {
                        "type": "object",
                        "properties": { "webhook_url": { "type": "string" } },
                        "required": ["webhook_url"],
                    },
                    "email": {
                        "type": "object",
                        "properties": {
                            "relay_host": { "type": "string" },
                            "username": { "type": "string" },
                            "password": { "type": "string" },
                            "from": { "type": "string" },
                        },
                        "required": ["relay_host", "username", "password", "from"],
                    },
                },
                "additionalProperties": false,
            },
            "routing_rules": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "conditions": { "type": "array" },
                        "channels": {
                            "type": "array",
                            "items": { "type": "string", "enum": ["TEAMS", "EMAIL"] },
                        },
                    },
                    "required": ["channels"],
                },
            },
            "max_concurrent_notifications": {
                "type": "integer", "minimum": 1, "default": DEFAULT_MAX_CONCURRENT_NOTIFICATIONS,
            },
            "history_retention_hours": {
                "type": "integer", "minimum": 0, "default": DEFAULT_HISTORY_RETENTION_HOURS,
            },
        },
        "additionalProperties": false,
    })
}

fn alerting_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "rules": { "type": "array" },
            "max_concurrent_alerts": {
                "type": "integer", "minimum": 1, "default": DEFAULT_MAX_CONCURRENT_ALERTS,
            },
        },
        "additionalProperties": false,
    })
}

fn escalation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "check_interval_seconds": {
                "type": "integer", "minimum": 1, "default": DEFAULT_CHECK_INTERVAL_SECONDS,
            },
            "escalation_policies": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "severity": {
                            "type": "string",
                            "enum": ["INFO", "LOW", "MEDIUM", "HIGH", "CRITICAL"],
                        },
                        "levels": { "type": "array", "items": { "type": "integer" } },
                        "timeframes": { "type": "array" },
                    },
                    "required": ["severity", "levels"],
                },
            },
            "escalation_targets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "level": { "type": "integer" },
                        "severity": {
                            "type": "string",
                            "enum": ["INFO", "LOW", "MEDIUM", "HIGH", "CRITICAL"],
                        },
                        "teams_webhook_url": { "type": "string" },
                        "email_address": { "type": "string" },
                    },
                    "required": ["level", "severity"],
                },
            },
        },
        "additionalProperties": false,
    })
}
