use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};

use coursescope_audit::{AuditError, AuditReport};

use crate::error::{ApiError, MalformedInputError};
use crate::models::UploadQuery;
use crate::state::AppState;
use crate::upload;

/// `POST /api/audit/upload`: parse an audit PDF and, when a `majorId` is
/// given, reconcile it against that major's requirements.
///
/// `majorId` may come as a form field or a query parameter; the form field
/// wins when both are present.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AuditReport>, ApiError> {
    let multipart = multipart.map_err(|e| MalformedInputError::Multipart(e.body_text()))?;
    let fields = upload::parse_multipart(multipart).await?;
    let major_id = upload::parse_major_id(fields.major_id.as_deref().or(query.major_id.as_deref()))?;

    let filename = fields.file.filename;
    let data = fields.file.data;
    tracing::info!(filename = %filename, bytes = data.len(), major_id, "audit upload");

    let report = run_audit_blocking(state, data, major_id).await?;
    tracing::info!(
        filename = %filename,
        courses = report.parsed.total(),
        summary = report.summary.summary().is_some(),
        "audit parsed"
    );
    Ok(Json(report))
}

/// Run the synchronous parse on the blocking pool.
async fn run_audit_blocking(
    state: Arc<AppState>,
    data: Vec<u8>,
    major_id: Option<i64>,
) -> Result<AuditReport, ApiError> {
    tokio::task::spawn_blocking(move || {
        coursescope_audit::run_audit(
            &data,
            major_id,
            &state.chain,
            &state.parsing,
            &state.catalog,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task join error: {e}")))?
    .map_err(|e: AuditError| {
        tracing::warn!(error = %e, "audit parse failed");
        ApiError::Internal(format!("Failed to parse PDF: {e}"))
    })
}
