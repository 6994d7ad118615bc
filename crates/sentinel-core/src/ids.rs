// crates/sentinel-core/src/ids.rs
// ============================================================================
// Module: Identifiers
// Description: Opaque newtype IDs for every core record.
// Purpose: Prevent accidental transposition of unrelated IDs at call sites.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Every record the core hands across a component boundary is referenced by
//! one of these newtypes rather than a raw `String`, so a caller cannot pass
//! an `AlertId` where a `RequestId` is expected and have it compile.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from an already-known string (e.g. restored from storage).
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(AlertId, "Opaque identifier for an [`crate::model::Alert`].");
opaque_id!(GroupId, "Opaque identifier for an [`crate::model::AlertGroup`].");
opaque_id!(RuleId, "Opaque identifier for a [`crate::model::Rule`].");
opaque_id!(RequestId, "Opaque identifier for an [`crate::model::ApprovalRequest`].");
opaque_id!(ResolutionId, "Opaque identifier for a [`crate::model::Resolution`].");
opaque_id!(ActionId, "Opaque identifier for a registered healing action.");
opaque_id!(ExecutionId, "Opaque identifier for a pipeline execution run.");
opaque_id!(IssueId, "Opaque identifier for the issue a resolution addresses.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_non_empty_and_unique() {
        let a = AlertId::generate();
        let b = AlertId::generate();
        assert!(!a.as_str().is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn display_round_trips_the_string() {
        let id = RuleId::from("r-1");
        assert_eq!(id.to_string(), "r-1");
        assert_eq!(id.as_str(), "r-1");
    }
}
