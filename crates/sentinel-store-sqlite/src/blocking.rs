// crates/sentinel-store-sqlite/src/blocking.rs
// ============================================================================
// Module: Blocking Bridge
// Description: Runs a synchronous rusqlite closure on tokio's blocking pool.
// Purpose: Let repositories implement async_trait without ever awaiting
//          inside a held mutex guard.
// Dependencies: sentinel-core, tokio
// ============================================================================

use sentinel_core::RepositoryError;

/// Runs `f` on tokio's blocking thread pool, mapping a task panic to a
/// [`RepositoryError::Backend`] rather than propagating it as a panic in the
/// calling async context.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, RepositoryError>
where
    F: FnOnce() -> Result<T, RepositoryError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_error) => {
            Err(RepositoryError::Backend(format!("blocking task panicked: {join_error}")))
        }
    }
}
