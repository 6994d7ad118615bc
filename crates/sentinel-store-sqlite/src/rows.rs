// crates/sentinel-store-sqlite/src/rows.rs
// ============================================================================
// Module: Row Mapping
// Description: Shared label/rank/codec helpers used by both repositories.
// Purpose: Keep the `record_json` canonical-blob convention in one place.
// Dependencies: sentinel-core, serde_json, time
// ============================================================================

//! ## Overview
//! Every table stores the full record as a JSON blob (`record_json`) plus a
//! handful of indexed columns derived from it. These helpers compute those
//! derived columns and decode the blob back into the model type; they never
//! need to agree with `serde`'s own `UPPERCASE`/`snake_case` renames exactly
//! since they're local storage labels, not wire formats, but mirroring them
//! keeps `EXPLAIN QUERY PLAN` output readable against the model.

use sentinel_core::AlertStatus;
use sentinel_core::ApprovalStatus;
use sentinel_core::Severity;
use time::OffsetDateTime;

use crate::error::StoreError;

/// Converts an [`OffsetDateTime`] to Unix seconds for an indexed column.
pub(crate) fn unix_seconds(timestamp: OffsetDateTime) -> i64 {
    timestamp.unix_timestamp()
}

/// Ordinal rank matching [`Severity`]'s declared ascending order, for a
/// `severity_rank` column queries can range-filter on.
pub(crate) const fn severity_rank(severity: Severity) -> i64 {
    match severity {
        Severity::Info => 0,
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 3,
        Severity::Critical => 4,
    }
}

/// Stable label for a `severity` column.
pub(crate) const fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "INFO",
        Severity::Low => "LOW",
        Severity::Medium => "MEDIUM",
        Severity::High => "HIGH",
        Severity::Critical => "CRITICAL",
    }
}

/// Stable label for an `alerts.status` column.
pub(crate) const fn alert_status_label(status: AlertStatus) -> &'static str {
    match status {
        AlertStatus::New => "NEW",
        AlertStatus::Acknowledged => "ACKNOWLEDGED",
        AlertStatus::Resolved => "RESOLVED",
        AlertStatus::Suppressed => "SUPPRESSED",
    }
}

/// Stable label for an `approval_requests.status` column.
pub(crate) const fn approval_status_label(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "PENDING",
        ApprovalStatus::Approved => "APPROVED",
        ApprovalStatus::Rejected => "REJECTED",
        ApprovalStatus::Expired => "EXPIRED",
    }
}

/// Deserializes a `record_json` blob into `T`.
pub(crate) fn decode_record<T: serde::de::DeserializeOwned>(blob: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(blob)
        .map_err(|err| StoreError::Db(format!("corrupt record_json: {err}")))
}

/// Serializes a record into its canonical `record_json` blob.
pub(crate) fn encode_record<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value)
        .map_err(|err| StoreError::Db(format!("failed to serialize record: {err}")))
}
