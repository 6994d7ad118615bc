// crates/sentinel-store-sqlite/src/connection.rs
// ============================================================================
// Module: Connection & Schema
// Description: Pragmas, schema initialization, and store configuration.
// Purpose: One place that knows how to open and prepare the database file.
// Dependencies: rusqlite, serde
// ============================================================================

//! ## Overview
//! Opens a single `SQLite` connection with WAL-mode durability pragmas and
//! creates the `alerts`/`approval_requests` tables on first use. Grounded on
//! the teacher's own `open_connection`/`apply_pragmas`/`initialize_schema`
//! trio, scaled down to the two tables this crate actually needs.

use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;

use crate::error::StoreError;

/// Schema version stamped into `store_meta` on first initialization.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout applied to the connection.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA_DDL: &str = "
CREATE TABLE IF NOT EXISTS alerts (
    alert_id TEXT PRIMARY KEY,
    alert_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    severity_rank INTEGER NOT NULL,
    component TEXT,
    execution_id TEXT,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    record_json BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_alerts_status ON alerts (status);
CREATE INDEX IF NOT EXISTS idx_alerts_severity_rank ON alerts (severity_rank);
CREATE INDEX IF NOT EXISTS idx_alerts_component ON alerts (component);
CREATE INDEX IF NOT EXISTS idx_alerts_execution_id ON alerts (execution_id);
CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts (created_at);

CREATE TABLE IF NOT EXISTS approval_requests (
    request_id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    record_json BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_approval_requests_status ON approval_requests (status);
";

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy, mainly useful for tests on filesystems
    /// without `mmap` support).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value for this mode.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite`-backed repositories.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|err| StoreError::Io(err.to_string()))
        }
        _ => Ok(()),
    }
}

/// Opens an `SQLite` connection with WAL durability pragmas and initializes
/// the schema if needed.
///
/// # Errors
///
/// Returns [`StoreError`] if the parent directory cannot be created, the
/// connection cannot be opened, or the schema is an unsupported version.
pub(crate) fn open_and_initialize(config: &SqliteStoreConfig) -> Result<Connection, StoreError> {
    ensure_parent_dir(&config.path)?;
    let mut connection = open_connection(config)?;
    initialize_schema(&mut connection)?;
    Ok(connection)
}

fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, StoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| StoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), StoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| StoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| StoreError::Db(err.to_string()))
}

fn initialize_schema(connection: &mut Connection) -> Result<(), StoreError> {
    let tx = connection.transaction().map_err(|err| StoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| StoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| StoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| StoreError::Db(err.to_string()))?;
            tx.execute_batch(SCHEMA_DDL).map_err(|err| StoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(StoreError::SchemaMismatch(format!("unsupported schema version: {value}")));
        }
    }
    tx.commit().map_err(|err| StoreError::Db(err.to_string()))
}
