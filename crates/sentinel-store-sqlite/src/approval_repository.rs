// crates/sentinel-store-sqlite/src/approval_repository.rs
// ============================================================================
// Module: Approval Repository
// Description: SQLite-backed sentinel_core::ApprovalRepository implementation.
// Purpose: Durable storage and querying for ApprovalRequest records.
// Dependencies: sentinel-core, rusqlite, tokio
// ============================================================================

//! ## Overview
//! Stores each [`ApprovalRequest`] as a canonical JSON blob (`record_json`)
//! plus a `status` column, the only dimension the expiry sweep and
//! operator-facing listings query on.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use sentinel_core::ApprovalRepository;
use sentinel_core::ApprovalRequest;
use sentinel_core::ApprovalStatus;
use sentinel_core::RepositoryError;
use sentinel_core::RequestId;

use crate::blocking::run_blocking;
use crate::rows::approval_status_label;
use crate::rows::decode_record;
use crate::rows::encode_record;

/// `SQLite`-backed implementation of [`ApprovalRepository`].
///
/// Cheap to clone: it shares the store's connection under an `Arc<Mutex<..>>`.
#[derive(Clone)]
pub struct SqliteApprovalRepository {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteApprovalRepository {
    pub(crate) const fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

fn lock_poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Backend("sqlite connection mutex poisoned".to_string())
}

fn insert_request(conn: &Connection, request: &ApprovalRequest) -> Result<(), RepositoryError> {
    let record_json = encode_record(request)?;
    conn.execute(
        "INSERT INTO approval_requests (request_id, status, record_json) VALUES (?1, ?2, ?3)",
        params![
            request.request_id.as_str(),
            approval_status_label(request.status),
            record_json
        ],
    )
    .map_err(|err| RepositoryError::Backend(err.to_string()))?;
    Ok(())
}

fn update_request(conn: &Connection, request: &ApprovalRequest) -> Result<u64, RepositoryError> {
    let record_json = encode_record(request)?;
    let changed = conn
        .execute(
            "UPDATE approval_requests SET status = ?2, record_json = ?3 WHERE request_id = ?1",
            params![
                request.request_id.as_str(),
                approval_status_label(request.status),
                record_json
            ],
        )
        .map_err(|err| RepositoryError::Backend(err.to_string()))?;
    Ok(u64::try_from(changed).unwrap_or(0))
}

#[async_trait]
impl ApprovalRepository for SqliteApprovalRepository {
    async fn add(&self, request: ApprovalRequest) -> Result<ApprovalRequest, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            insert_request(&conn, &request)?;
            Ok(request)
        })
        .await
    }

    async fn get(&self, request_id: &RequestId) -> Result<ApprovalRequest, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        let request_id = request_id.clone();
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let blob: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record_json FROM approval_requests WHERE request_id = ?1",
                    params![request_id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            let blob = blob.ok_or_else(|| RepositoryError::NotFound(request_id.to_string()))?;
            decode_record(&blob).map_err(RepositoryError::from)
        })
        .await
    }

    async fn update(&self, request: ApprovalRequest) -> Result<ApprovalRequest, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            if update_request(&conn, &request)? == 0 {
                return Err(RepositoryError::NotFound(request.request_id.to_string()));
            }
            Ok(request)
        })
        .await
    }

    async fn query_by_status(
        &self,
        status: ApprovalStatus,
    ) -> Result<Vec<ApprovalRequest>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let conn = connection.lock().map_err(lock_poisoned)?;
            let mut statement = conn
                .prepare(
                    "SELECT record_json FROM approval_requests WHERE status = ?1 ORDER BY request_id",
                )
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            let rows = statement
                .query_map(params![approval_status_label(status)], |row| row.get::<_, Vec<u8>>(0))
                .map_err(|err| RepositoryError::Backend(err.to_string()))?;
            let mut requests = Vec::new();
            for row in rows {
                let blob = row.map_err(|err| RepositoryError::Backend(err.to_string()))?;
                requests.push(decode_record(&blob)?);
            }
            Ok(requests)
        })
        .await
    }

    async fn batch_update(
        &self,
        requests: Vec<ApprovalRequest>,
    ) -> Result<Vec<ApprovalRequest>, RepositoryError> {
        let connection = Arc::clone(&self.connection);
        run_blocking(move || {
            let mut conn = connection.lock().map_err(lock_poisoned)?;
            let tx = conn.transaction().map_err(|err| RepositoryError::Backend(err.to_string()))?;
            for request in &requests {
                if update_request(&tx, request)? == 0 {
                    return Err(RepositoryError::NotFound(request.request_id.to_string()));
                }
            }
            tx.commit().map_err(|err| RepositoryError::Backend(err.to_string()))?;
            Ok(requests)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sentinel_core::ActionId;
    use sentinel_core::ImpactLevel;
    use sentinel_core::IssueId;
    use time::OffsetDateTime;

    use super::*;
    use crate::connection::SqliteStoreConfig;
    use crate::connection::SqliteStoreMode;
    use crate::store::SqliteStore;

    fn sample_request(status: ApprovalStatus) -> ApprovalRequest {
        let now = OffsetDateTime::now_utc();
        ApprovalRequest {
            request_id: RequestId::generate(),
            action_id: ActionId::generate(),
            action_type: "restart_service".to_string(),
            issue_id: IssueId::generate(),
            issue_description: "ingest lag exceeded ceiling".to_string(),
            action_details: BTreeMap::new(),
            confidence_score: 0.9,
            impact_score: 0.4,
            impact_level: ImpactLevel::Medium,
            status,
            requester: "sentinel-engine".to_string(),
            approver: None,
            created_at: now,
            updated_at: now,
            expires_at: now + time::Duration::hours(24),
            rejection_reason: None,
            context: BTreeMap::new(),
        }
    }

    fn open_repository() -> (tempfile::TempDir, SqliteApprovalRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(SqliteStoreConfig {
            path: dir.path().join("sentinel.db"),
            busy_timeout_ms: 5_000,
            journal_mode: SqliteStoreMode::Wal,
        })
        .expect("store opens");
        let repository = store.approval_repository();
        (dir, repository)
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let (_dir, repository) = open_repository();
        let request = sample_request(ApprovalStatus::Pending);
        let added = repository.add(request.clone()).await.expect("add succeeds");
        let fetched = repository.get(&added.request_id).await.expect("get succeeds");
        assert_eq!(fetched.request_id, request.request_id);
        assert_eq!(fetched.status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn query_by_status_filters_correctly() {
        let (_dir, repository) = open_repository();
        repository.add(sample_request(ApprovalStatus::Pending)).await.expect("add");
        repository.add(sample_request(ApprovalStatus::Approved)).await.expect("add");

        let pending = repository
            .query_by_status(ApprovalStatus::Pending)
            .await
            .expect("query succeeds");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn batch_update_applies_to_every_request() {
        let (_dir, repository) = open_repository();
        let first = repository.add(sample_request(ApprovalStatus::Pending)).await.expect("add");
        let second = repository.add(sample_request(ApprovalStatus::Pending)).await.expect("add");

        let mut expired_first = first.clone();
        expired_first.status = ApprovalStatus::Expired;
        let mut expired_second = second.clone();
        expired_second.status = ApprovalStatus::Expired;

        let updated = repository
            .batch_update(vec![expired_first, expired_second])
            .await
            .expect("batch update succeeds");
        assert_eq!(updated.len(), 2);
        let remaining_pending = repository
            .query_by_status(ApprovalStatus::Pending)
            .await
            .expect("query");
        assert!(remaining_pending.is_empty());
    }

    #[tokio::test]
    async fn update_missing_request_is_not_found() {
        let (_dir, repository) = open_repository();
        let error = repository
            .update(sample_request(ApprovalStatus::Pending))
            .await
            .expect_err("should not exist");
        assert!(matches!(error, RepositoryError::NotFound(_)));
    }
}
