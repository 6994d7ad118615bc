// crates/sentinel-store-sqlite/src/alert_repository.rs
// ============================================================================
// Module: Alert Repository
// Description: SQLite-backed sentinel_core::AlertRepository implementation.
// Purpose: Durable storage and querying for Alert records.
// Dependencies: sentinel-core, rusqlite, tokio
// ============================================================================

//! ## Overview
//! Stores each [`Alert`] as a canonical JSON blob (`record_json`) plus the
//! columns its queries filter or order on: status, severity rank, component,
//! execution id, and creation time. Every trait method locks the shared
//! connection inside [`crate::blocking::run_blocking`] so the async caller
//! never blocks its own executor thread on `SQLite` I/O.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Params;
use rusqlite::params;
use sentinel_core::Alert;
use sentinel_core::AlertId;
use sentinel_core::AlertRepository;
use sentinel_core::AlertStatus;
use sentinel_core::ExecutionId;
use sentinel_core::NotificationAttempt;
use sentinel_core::RepositoryError;
use sentinel_core::Severity;
use sentinel_core::TimeRange;
use time::OffsetDateTime;

use crate::blocking::run_blocking;
use crate::rows::alert_status_label;
use crate::rows::decode_record;
use crate::rows::encode_record;
use crate::rows::severity_label;
use crate::rows::severity_rank;
use crate::rows::unix_seconds;

/// `SQLite`-backed implementation of [`AlertRepository`].
///
/// Cheap to clone: it shares the store's connection under an `Arc<Mutex<..>>`.
#[derive(Clone)]
pub struct SqliteAlertRepository {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAlertRepository {
    pub(crate) const fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn lock_poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Backend("sqlite connection mutex poisoned".to_string())
}

fn insert_alert(conn: &Connection, alert: &Alert) -> Result<(), RepositoryError> {
    let record_json = encode_record(alert)?;
    conn.execute(
        "INSERT INTO alerts (alert_id, alert_type, severity, severity_rank, component, execution_id, status, created_at, record_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            alert.alert_id.as_str(),
            alert.alert_type,
            severity_label(alert.severity),
            severity_rank(alert.severity),
            alert.component,
            alert.execution_id.as_ref().map(ExecutionId::as_str),
            alert_status_label(alert.status),
            unix_seconds(alert.created_at),
            record_json,
        ],
    )
    .map_err(|err| RepositoryError::Backend(err.to_string()))?;
    Ok(())
}

fn query_alerts<P: Params>(
    conn: &Connection,
    sql: &str,
    query_params: P,
) -> Result<Vec<Alert>, RepositoryError> {
    let mut statement =
        conn.prepare(sql).map_err(|err| RepositoryError::Backend(err.to_string()))?;
    let rows = statement
        .query_map(query_params, |row| row.get::<_, Vec<u8>>(0))
        .map_err(|err| RepositoryError::Backend(err.to_string()))?;
    let mut alerts = Vec::new();
    for row in rows {
        let blob = row.map_err(|err| RepositoryError::Backend(err.to_string()))?;
        alerts.push(decode_record(&blob)?);
    }
    Ok(alerts)
}

#[async_trait]
impl AlertRepository for SqliteAlertRepository {
    async fn create(&self, alert: Alert) -> Result<Alert, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            insert_alert(&conn, &alert)?;
            Ok(alert)
        })
        .await
    }

    async fn batch_create(&self, alerts: Vec<Alert>) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let mut conn = connection.lock().map_err(lock_poisoned)?;
            let tx = conn.transaction().map_err(|err| RepositoryError::Backend(err.to_string()))?;
            for alert in &alerts {
                insert_alert(&tx, alert)?;
            }
            tx.commit().map_err(|err| RepositoryError::Backend(err.to_string()))?;
            Ok(alerts)
        })
        .await
    }

    async fn get(&self, alert_id: &AlertId) -> Result<Alert, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        let alert_id = alert_id.clone();
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let blob: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record_json FROM alerts WHERE alert_id = ?1",
                    params![alert_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            let blob = blob.ok_or_else(|| RepositoryError::NotFound(alert_id.to_string()))?;
            decode_record(&blob).map_err(RepositoryError::from)
        })
        .await
    }

    async fn update(&self, alert: Alert) -> Result<Alert, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let record_json = encode_record(&alert)?;
            let changed = conn
                .execute(
                    "UPDATE alerts SET alert_type = ?2, severity = ?3, severity_rank = ?4, component = ?5,
                     execution_id = ?6, status = ?7, created_at = ?8, record_json = ?9 WHERE alert_id = ?1",
                    params![
                        alert.alert_id.as_str(),
                        alert.alert_type,
                        severity_label(alert.severity),
                        severity_rank(alert.severity),
                        alert.component,
                        alert.execution_id.as_ref().map(ExecutionId::as_str),
                        alert_status_label(alert.status),
                        unix_seconds(alert.created_at),
                        record_json,
                    ],
                )
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            if changed == 0 {
                return Err(RepositoryError::NotFound(alert.alert_id.to_string()));
            }
            Ok(alert)
        })
        .await
    }

    async fn query_by_status(&self, status: AlertStatus) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            query_alerts(
                &conn,
                "SELECT record_json FROM alerts WHERE status = ?1 ORDER BY created_at",
                params![alert_status_label(status)],
            )
        })
        .await
    }

    async fn query_by_severity(&self, minimum: Severity) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            query_alerts(
                &conn,
                "SELECT record_json FROM alerts WHERE severity_rank >= ?1 ORDER BY created_at",
                params![severity_rank(minimum)],
            )
        })
        .await
    }

    async fn query_by_component(&self, component: &str) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        let component = component.to_string();
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            query_alerts(
                &conn,
                "SELECT record_json FROM alerts WHERE component = ?1 ORDER BY created_at",
                params![component],
            )
        })
        .await
    }

    async fn query_by_execution_id(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        let execution_id = execution_id.clone();
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            query_alerts(
                &conn,
                "SELECT record_json FROM alerts WHERE execution_id = ?1 ORDER BY created_at",
                params![execution_id.as_str()],
            )
        })
        .await
    }

    async fn query_by_time_range(&self, range: TimeRange) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            query_alerts(
                &conn,
                "SELECT record_json FROM alerts WHERE created_at >= ?1 AND created_at <= ?2 \
                 ORDER BY created_at",
                params![unix_seconds(range.from), unix_seconds(range.to)],
            )
        })
        .await
    }

    async fn get_active_alerts(&self) -> Result<Vec<Alert>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            query_alerts(
                &conn,
                "SELECT record_json FROM alerts WHERE status NOT IN ('RESOLVED', 'SUPPRESSED') \
                 ORDER BY created_at",
                params![],
            )
        })
        .await
    }

    async fn count_by_status(&self, status: AlertStatus) -> Result<u64, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM alerts WHERE status = ?1",
                    params![alert_status_label(status)],
                    |row| row.get(0),
                )
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
        .await
    }

    async fn add_notification(
        &self,
        alert_id: &AlertId,
        attempt: NotificationAttempt,
    ) -> Result<(), RepositoryError> {
        let connection = Arc::clone(&self.connection);
        let alert_id = alert_id.clone();
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let blob: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record_json FROM alerts WHERE alert_id = ?1",
                    params![alert_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            let blob = blob.ok_or_else(|| RepositoryError::NotFound(alert_id.to_string()))?;
            let mut alert: Alert = decode_record(&blob)?;
            alert.notifications.push(attempt);
            let record_json = encode_record(&alert)?;
            conn.execute(
                "UPDATE alerts SET record_json = ?2 WHERE alert_id = ?1",
                params![alert_id.as_str(), record_json],
            )
            .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let changed = conn
                .execute("DELETE FROM alerts WHERE created_at < ?1", params![unix_seconds(cutoff)])
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            Ok(u64::try_from(changed).unwrap_or(0))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sentinel_core::AlertStatus;

    use super::*;
    use crate::connection::SqliteStoreMode;
    use crate::store::SqliteStore;

    fn sample_alert(severity: Severity, status: AlertStatus) -> Alert {
        let now = OffsetDateTime::now_utc();
        Alert {
            alert_id: AlertId::generate(),
            alert_type: "rule_threshold".to_string(),
            description: "ingest lag exceeded ceiling".to_string(),
            severity,
            context: BTreeMap::new(),
            component: Some("ingest".to_string()),
            execution_id: Some(ExecutionId::generate()),
            source: "sentinel-rules".to_string(),
            status,
            created_at: now,
            updated_at: now,
            acknowledged_at: None,
            resolved_at: None,
            related_alerts: Vec::new(),
            notifications: Vec::new(),
            acknowledgment_details: None,
            resolution_details: None,
        }
    }

    fn open_repository() -> (tempfile::TempDir, SqliteAlertRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(crate::connection::SqliteStoreConfig {
            path: dir.path().join("sentinel.db"),
            busy_timeout_ms: 5_000,
            journal_mode: SqliteStoreMode::Wal,
        })
        .expect("store opens");
        let repository = store.alert_repository();
        (dir, repository)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (_dir, repository) = open_repository();
        let alert = sample_alert(Severity::High, AlertStatus::New);
        let created = repository.create(alert.clone()).await.expect("create succeeds");
        let fetched = repository.get(&created.alert_id).await.expect("get succeeds");
        assert_eq!(fetched.alert_id, alert.alert_id);
        assert_eq!(fetched.description, alert.description);
    }

    #[tokio::test]
    async fn get_missing_alert_is_not_found() {
        let (_dir, repository) = open_repository();
        let error = repository.get(&AlertId::generate()).await.expect_err("should not exist");
        assert!(matches!(error, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_missing_alert_is_not_found() {
        let (_dir, repository) = open_repository();
        let alert = sample_alert(Severity::Low, AlertStatus::New);
        let error = repository.update(alert).await.expect_err("should not exist");
        assert!(matches!(error, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn query_by_severity_is_inclusive_of_higher_severities() {
        let (_dir, repository) = open_repository();
        repository
            .create(sample_alert(Severity::Low, AlertStatus::New))
            .await
            .expect("create");
        repository
            .create(sample_alert(Severity::High, AlertStatus::New))
            .await
            .expect("create");
        repository
            .create(sample_alert(Severity::Critical, AlertStatus::New))
            .await
            .expect("create");

        let at_least_high = repository
            .query_by_severity(Severity::High)
            .await
            .expect("query succeeds");
        assert_eq!(at_least_high.len(), 2);
    }

    #[tokio::test]
    async fn get_active_alerts_excludes_resolved_and_suppressed() {
        let (_dir, repository) = open_repository();
        repository
            .create(sample_alert(Severity::Medium, AlertStatus::New))
            .await
            .expect("create");
        repository
            .create(sample_alert(Severity::Medium, AlertStatus::Resolved))
            .await
            .expect("create");
        repository
            .create(sample_alert(Severity::Medium, AlertStatus::Suppressed))
            .await
            .expect("create");

        let active = repository.get_active_alerts().await.expect("query succeeds");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].status, AlertStatus::New);
    }

    #[tokio::test]
    async fn add_notification_appends_to_history() {
        let (_dir, repository) = open_repository();
        let created = repository
            .create(sample_alert(Severity::High, AlertStatus::New))
            .await
            .expect("create");
        let attempt = NotificationAttempt {
            channel: sentinel_core::Channel::Teams,
            recipient: "oncall".to_string(),
            success: true,
            details: BTreeMap::new(),
            timestamp: OffsetDateTime::now_utc(),
        };
        repository.add_notification(&created.alert_id, attempt).await.expect("append succeeds");
        let fetched = repository.get(&created.alert_id).await.expect("get succeeds");
        assert_eq!(fetched.notifications.len(), 1);
    }

    #[tokio::test]
    async fn delete_older_than_removes_stale_alerts() {
        let (_dir, repository) = open_repository();
        let mut stale = sample_alert(Severity::Info, AlertStatus::Resolved);
        stale.created_at = OffsetDateTime::from_unix_timestamp(0).expect("valid timestamp");
        repository.create(stale).await.expect("create");
        repository.create(sample_alert(Severity::Info, AlertStatus::New)).await.expect("create");

        let removed = repository
            .delete_older_than(OffsetDateTime::now_utc() - time::Duration::hours(1))
            .await
            .expect("delete succeeds");
        assert_eq!(removed, 1);
        assert_eq!(repository.get_active_alerts().await.expect("query").len(), 1);
    }

    #[tokio::test]
    async fn batch_create_persists_every_alert() {
        let (_dir, repository) = open_repository();
        let alerts = vec![
            sample_alert(Severity::Low, AlertStatus::New),
            sample_alert(Severity::Medium, AlertStatus::New),
        ];
        let created = repository.batch_create(alerts).await.expect("batch create succeeds");
        assert_eq!(created.len(), 2);
        assert_eq!(repository.count_by_status(AlertStatus::New).await.expect("count"), 2);
    }
}
