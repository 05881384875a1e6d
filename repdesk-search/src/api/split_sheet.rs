//! Split sheet endpoints

use axum::{extract::State, routing::post, Json, Router};
use repdesk_common::{total_share, SongInfo, Writer};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::split_sheet::{validate_split_sheet, SplitSheetIssue};
use crate::{ApiError, ApiResult, AppState};

/// Song metadata plus contributors
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSheetRequest {
    #[serde(default)]
    pub song_info: SongInfo,
    #[serde(default)]
    pub writers: Vec<Writer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    pub total_share: f64,
    pub errors: Vec<String>,
    pub issues: Vec<SplitSheetIssue>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub sent: usize,
}

/// POST /api/split-sheet/validate
pub async fn validate(Json(request): Json<SplitSheetRequest>) -> Json<ValidateResponse> {
    let issues = validate_split_sheet(&request.song_info, &request.writers);

    Json(ValidateResponse {
        valid: issues.is_empty(),
        total_share: total_share(&request.writers),
        errors: issues.iter().map(ToString::to_string).collect(),
        issues,
    })
}

/// POST /api/split-sheet/send
///
/// Rejected with 400 before any mail goes out if the sheet breaks a rule.
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<SplitSheetRequest>,
) -> ApiResult<Json<SendResponse>> {
    let issues = validate_split_sheet(&request.song_info, &request.writers);
    if !issues.is_empty() {
        return Err(ApiError::Validation(issues));
    }

    let sent = state
        .notifier
        .send(&request.song_info, &request.writers)
        .await?;

    info!(title = %request.song_info.title, sent, "Split sheet dispatched");
    Ok(Json(SendResponse { success: true, sent }))
}

/// Build split sheet routes
pub fn split_sheet_routes() -> Router<AppState> {
    Router::new()
        .route("/api/split-sheet/validate", post(validate))
        .route("/api/split-sheet/send", post(send))
}
