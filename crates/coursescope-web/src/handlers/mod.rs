pub mod audit;
pub mod courses;
pub mod index;
pub mod majors;

use coursescope_catalog::{CatalogDatabase, CatalogError};

use crate::error::ApiError;
use crate::state::AppState;

/// Run a catalog query on the blocking pool; SQLite calls block.
pub(crate) async fn with_catalog<T, F>(state: &AppState, query: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&CatalogDatabase) -> Result<T, CatalogError> + Send + 'static,
{
    let catalog = state.catalog.clone();
    tokio::task::spawn_blocking(move || query(&catalog.lock()))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {e}")))?
        .map_err(ApiError::from)
}
