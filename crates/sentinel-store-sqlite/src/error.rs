// crates/sentinel-store-sqlite/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: Construction/connection-time errors distinct from per-call RepositoryError.
// Purpose: Separate "the store could not be opened" from "one query failed".
// Dependencies: sentinel-core, thiserror
// ============================================================================

use sentinel_core::RepositoryError;
use thiserror::Error;

/// Errors opening or initializing the `SQLite`-backed store.
///
/// Per-call failures on an already-open store are reported through
/// [`RepositoryError`] instead, per the trait contract in
/// `sentinel_core::interfaces`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file or its parent directory could not be
    /// created/opened.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// The `SQLite` engine rejected a connection-setup or schema statement.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// The stored schema version is newer or otherwise incompatible with
    /// this build.
    #[error("sqlite store schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl From<StoreError> for RepositoryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Io(message)
            | StoreError::Db(message)
            | StoreError::SchemaMismatch(message) => Self::Backend(message),
        }
    }
}
