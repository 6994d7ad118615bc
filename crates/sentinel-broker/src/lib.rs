// crates/sentinel-broker/src/lib.rs
// ============================================================================
// Module: Sentinel Broker Library
// Description: Notification Router — channel resolution, message formatting, dispatch.
// Purpose: Give the Generator and Escalation Manager one call that routes and delivers an alert.
// Dependencies: sentinel-core, futures, tokio, reqwest
// ============================================================================

//! ## Overview
//! Sentinel Broker is the Notification Router (spec §4.3). [`format`] turns
//! an alert into a [`FormattedMessage`]; [`routing`] decides which channels
//! it goes to; [`router`]'s [`NotificationRouter`] dispatches it to those
//! channels concurrently, with per-channel failure isolation and a bounded
//! worker pool.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod format;
pub mod router;
pub mod routing;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use format::FormattedMessage;
pub use format::SeverityStyle;
pub use format::format_message;
pub use format::severity_style;
pub use router::DeliveryRecord;
pub use router::DeliveryResult;
pub use router::NotificationRouter;
pub use router::PER_CHANNEL_TIMEOUT;
pub use router::PER_MESSAGE_TIMEOUT;
pub use router::Recipients;
pub use routing::FallbackChannels;
pub use routing::RoutingFields;
pub use routing::RoutingRule;
pub use routing::RuleCondition;
pub use routing::resolve_channels;
