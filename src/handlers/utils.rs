//! Shared handler helpers

use std::sync::Arc;

use super::router::AppState;
use crate::errors::AppError;
use crate::gesture::GestureStore;

/// Run a store operation on the blocking pool
///
/// Every store call takes the index lock, and writers hold it through the
/// backup rewrite (fsync included). Readers queued behind a writer must not
/// park a runtime worker, so even read-only calls go through here.
pub async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, AppError>
where
    F: FnOnce(&GestureStore) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task panicked: {e}")))?
}
