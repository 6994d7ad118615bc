// predicate-logic/src/lib.rs
// ============================================================================
// Module: Requirement Root
// Description: Public API surface for the requirement subsystem.
// Purpose: Wire together core modules and re-exports.
// Dependencies: crate::{builder, requirement}
// ============================================================================

//! ## Overview
//! This crate exposes a small, domain-agnostic Boolean algebra
//! (`And`/`Or`/`Not`/`RequireGroup`/`Predicate`) with short-circuit
//! evaluation and an optional trace hook. It is the evaluation substrate for
//! compound rule expressions elsewhere in the workspace.

pub mod builder;
pub mod requirement;

pub use requirement::NoopTrace;
pub use requirement::PredicateEval;
pub use requirement::RecordingTrace;
pub use requirement::Requirement;
pub use requirement::RequirementGroup;
pub use requirement::RequirementGroupError;
pub use requirement::RequirementId;
pub use requirement::RequirementIdError;
pub use requirement::RequirementTrace;

/// Convenience functions for creating requirements without builders
pub mod convenience {
    use super::Requirement;

    /// Creates a requirement requiring all of the given requirements
    #[must_use]
    pub fn all<P>(requirements: Vec<Requirement<P>>) -> Requirement<P> {
        Requirement::and(requirements)
    }

    /// Creates a requirement requiring any of the given requirements
    #[must_use]
    pub fn any<P>(requirements: Vec<Requirement<P>>) -> Requirement<P> {
        Requirement::or(requirements)
    }

    /// Creates a requirement that inverts another requirement
    #[must_use]
    pub fn not<P>(requirement: Requirement<P>) -> Requirement<P> {
        Requirement::negate(requirement)
    }

    /// Creates a requirement requiring at least N of the given requirements
    #[must_use]
    pub fn at_least<P>(min: u8, requirements: Vec<Requirement<P>>) -> Requirement<P> {
        Requirement::require_group(min, requirements)
    }

    /// Creates a requirement from a predicate
    #[must_use]
    pub const fn predicate<P>(predicate: P) -> Requirement<P> {
        Requirement::predicate(predicate)
    }
}
