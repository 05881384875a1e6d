//! repdesk-search library interface
//!
//! Exposes the router, state and services for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{SearchOrchestrator, SplitSheetNotifier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Saved-records database
    pub db: SqlitePool,
    /// Search entry point with the render credential injected
    pub search: Arc<SearchOrchestrator>,
    /// Split-sheet mailer with the mail credential injected
    pub notifier: Arc<SplitSheetNotifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, search: SearchOrchestrator, notifier: SplitSheetNotifier) -> Self {
        Self {
            db,
            search: Arc::new(search),
            notifier: Arc::new(notifier),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::search_routes())
        .merge(api::collection_routes())
        .merge(api::split_sheet_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
