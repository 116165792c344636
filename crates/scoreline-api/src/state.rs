use std::sync::Arc;

use tracing::error;

use scoreline_chain::LedgerMirror;
use scoreline_db::Database;

use crate::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub mirror: LedgerMirror,
}

/// Run a ledger call on the blocking pool so SQLite never stalls the
/// async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> scoreline_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Join
        })?
        .map_err(ApiError::from)
}
