//! Search endpoint
//!
//! POST /api/search always answers with the search envelope, including on
//! failure, so clients can branch on `success` alone.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use repdesk_common::{Error, SearchCategory};
use serde::Deserialize;
use tracing::{info, warn};

use crate::services::search_orchestrator::error_message;
use crate::services::SearchResponse;
use crate::AppState;

/// Search request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    /// writer, publisher or performer
    #[serde(default)]
    pub search_type: String,
}

fn failure_status(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchResponse>) {
    let category = match request.search_type.parse::<SearchCategory>() {
        Ok(category) => category,
        Err(e) => {
            warn!(search_type = %request.search_type, "Rejected search type");
            return (failure_status(&e), Json(SearchResponse::failure(error_message(&e))));
        }
    };

    info!(query = %request.query, category = %category, "Search requested");

    match state.search.search(&request.query, category).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.into())),
        Err(e) => {
            warn!(query = %request.query, category = %category, error = %e, "Search failed");
            (failure_status(&e), Json(SearchResponse::failure(error_message(&e))))
        }
    }
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", post(search))
}
