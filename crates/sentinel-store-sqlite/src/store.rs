// crates/sentinel-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Store
// Description: Owns the shared connection and hands out repository handles.
// Purpose: Single open/init point for both repositories.
// Dependencies: rusqlite, sentinel-core
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::alert_repository::SqliteAlertRepository;
use crate::approval_repository::SqliteApprovalRepository;
use crate::connection::SqliteStoreConfig;
use crate::connection::open_and_initialize;
use crate::error::StoreError;

/// Opens and owns the single `SQLite` connection backing both repositories.
///
/// Cloning a repository handle (`alert_repository()`/`approval_repository()`)
/// is cheap: it shares this store's connection under an `Arc<Mutex<..>>`, so
/// many repository handles can be handed out to different components without
/// opening more than one file handle.
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens the database at `config.path`, creating it and its schema if
    /// this is the first run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or the schema is
    /// an unsupported version.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, StoreError> {
        let connection = open_and_initialize(&config)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    /// Returns a handle implementing [`sentinel_core::AlertRepository`].
    #[must_use]
    pub fn alert_repository(&self) -> SqliteAlertRepository {
        SqliteAlertRepository::new(Arc::clone(&self.connection))
    }

    /// Returns a handle implementing [`sentinel_core::ApprovalRepository`].
    #[must_use]
    pub fn approval_repository(&self) -> SqliteApprovalRepository {
        SqliteApprovalRepository::new(Arc::clone(&self.connection))
    }
}
