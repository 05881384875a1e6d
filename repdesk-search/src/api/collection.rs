//! Saved-records collection endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use repdesk_common::SavedRecord;
use serde::{Deserialize, Serialize};

use crate::db::saved_records::{self, NewSavedRecord};
use crate::services::export::{export, ExportFormat};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub items: Vec<NewSavedRecord>,
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub inserted: Vec<SavedRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/collection
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<Vec<SavedRecord>>> {
    Ok(Json(saved_records::list(&state.db).await?))
}

/// POST /api/collection
///
/// **Request:** `{"items": [{"name", "ipiNumber", "type"}]}`
/// **Errors:** 400 when the selection is empty or an item has a blank field
pub async fn insert_records(
    State(state): State<AppState>,
    Json(request): Json<InsertRequest>,
) -> ApiResult<Json<InsertResponse>> {
    if request.items.is_empty() {
        return Err(ApiError::BadRequest("No records selected".to_string()));
    }

    let inserted = saved_records::insert(&state.db, &request.items).await?;
    Ok(Json(InsertResponse { inserted }))
}

/// DELETE /api/collection
pub async fn delete_records(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = saved_records::delete(&state.db, &request.ids).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// GET /api/collection/export?format=csv|json
///
/// Defaults to CSV. Served as an attachment.
pub async fn export_records(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let format = match params.format.as_deref() {
        Some(f) => f.parse::<ExportFormat>()?,
        None => ExportFormat::Csv,
    };

    let records = saved_records::list(&state.db).await?;
    let body = export(&records, format)?;

    tracing::info!(records = records.len(), format = ?format, "Collection exported");

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}

/// Build collection routes
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/collection",
            get(list_records).post(insert_records).delete(delete_records),
        )
        .route("/api/collection/export", get(export_records))
}
