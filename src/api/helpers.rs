use serde::Serialize;

use crate::audit::{AuditError, AuditLog, AuditLogEntry};
use crate::error::ApiError;
use crate::store::AppState;

#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T: Serialize> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Run file-backed work on the blocking pool and lift its error into `ApiError`.
pub async fn blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}")))?
        .map_err(Into::into)
}

/// Write an audit entry. Failures are logged and never fail the request.
pub async fn record<F>(state: &AppState, write: F)
where
    F: FnOnce(&AuditLog) -> Result<AuditLogEntry, AuditError> + Send + 'static,
{
    let audit = state.audit.clone();
    match tokio::task::spawn_blocking(move || write(&audit)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "failed to write audit log entry"),
        Err(e) => tracing::warn!(error = %e, "audit write task failed"),
    }
}
