// crates/sentinel-providers/src/lib.rs
// ============================================================================
// Module: Sentinel Providers Library
// Description: Default production implementations of the engine's external-interface traits.
// Purpose: Give a composition root a working Clock, AnomalyDetector, transports, and executor out
//   of the box.
// Dependencies: sentinel-core, reqwest, lettre, tokio
// ============================================================================

//! ## Overview
//! Sentinel Providers supplies the concrete collaborators named in spec §6
//! but consumed only through `sentinel-core::interfaces` traits:
//! [`clock::SystemClock`] for [`sentinel_core::Clock`],
//! [`anomaly::ZScoreAnomalyDetector`] for [`sentinel_core::AnomalyDetector`],
//! [`teams::TeamsWebhookTransport`] for [`sentinel_core::TeamsTransport`],
//! [`email::SmtpEmailTransport`] for [`sentinel_core::EmailTransport`], and
//! [`executor::ShellHealingExecutor`] for [`sentinel_core::HealingExecutor`].
//! None of these are required by the decision core itself — every engine
//! component takes the trait object, not the concrete type — but a real
//! deployment needs something wired in, and this crate is where the
//! workspace keeps it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod anomaly;
pub mod clock;
pub mod email;
pub mod executor;
pub mod teams;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use anomaly::ZScoreAnomalyDetector;
pub use clock::FixedClock;
pub use clock::SteppedClock;
pub use clock::SystemClock;
pub use email::SmtpEmailTransport;
pub use executor::CommandTemplate;
pub use executor::ShellHealingExecutor;
pub use teams::TeamsWebhookTransport;
