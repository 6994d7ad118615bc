// crates/sentinel-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Store
// Description: Durable AlertRepository/ApprovalRepository backed by SQLite.
// Purpose: Give the engine a persistence boundary it never has to reimplement.
// Dependencies: sentinel-core, rusqlite, serde_json, tokio
// ============================================================================

//! ## Overview
//! `sentinel-store-sqlite` is the concrete implementation of
//! [`sentinel_core::AlertRepository`] and [`sentinel_core::ApprovalRepository`]
//! named by those traits' doc comments. Each record is stored as a canonical
//! JSON blob (`record_json`) alongside the handful of columns its queries
//! actually filter or order on, so the schema absorbs new `Alert`/
//! `ApprovalRequest` fields without a migration.
//!
//! Unlike a run-state store serving many tenants and namespaces at
//! production scale, Sentinel has exactly two narrow repositories with no
//! cross-tenant partitioning, so this crate deliberately does not carry a
//! background writer thread or a read-connection pool: one connection,
//! guarded by a mutex and bridged onto a blocking thread pool per call, is
//! enough durability machinery for this surface.

mod blocking;
mod connection;
mod error;
mod rows;

pub mod alert_repository;
pub mod approval_repository;
pub mod store;

pub use alert_repository::SqliteAlertRepository;
pub use approval_repository::SqliteApprovalRepository;
pub use connection::SqliteStoreConfig;
pub use connection::SqliteStoreMode;
pub use error::StoreError;
pub use store::SqliteStore;
