//! Search request entry point
//!
//! Routes a query to the repertory adapters (writer/publisher) or to the real
//! name resolver (performer) and wraps the outcome in a uniform envelope.

use futures::future::join_all;
use repdesk_common::{Error, Result, SearchCategory, SearchResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::real_name_resolver::RealNameResolver;
use super::render_client::PageRenderer;
use super::repertory::{Repertory, RepertoryAdapter};

const MISSING_RENDER_KEY: &str =
    "Render provider API key not configured (set REPDESK_RENDER_API_KEY or [render] api_key)";

/// Response envelope returned to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
    /// Present for performer searches; `null` when no legal name was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Successful search outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    /// `Some` only for performer searches
    pub real_name: Option<Option<String>>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            success: true,
            results: Some(outcome.results),
            real_name: outcome.real_name,
            error: None,
        }
    }
}

/// Fans queries out to adapters and the resolver
pub struct SearchOrchestrator {
    adapters: Vec<RepertoryAdapter>,
    resolver: Option<RealNameResolver>,
    requery_performers: bool,
}

impl SearchOrchestrator {
    /// `renderer` is `None` when no render credential is configured; every
    /// search then fails with a configuration error.
    pub fn new(
        renderer: Option<Arc<dyn PageRenderer>>,
        repertories: &[Repertory],
        wait_ms: u64,
        requery_performers: bool,
    ) -> Self {
        let adapters = renderer
            .as_ref()
            .map(|r| {
                repertories
                    .iter()
                    .map(|rep| RepertoryAdapter::new(*rep, Arc::clone(r), wait_ms))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            adapters,
            resolver: renderer.map(RealNameResolver::new),
            requery_performers,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.resolver.is_some()
    }

    /// Run one search
    ///
    /// Errors: `Config` when the renderer is missing, `InvalidInput` for a
    /// blank query. Provider failures are not errors here.
    pub async fn search(&self, query: &str, category: SearchCategory) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("Search query is required".to_string()));
        }

        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| Error::Config(MISSING_RENDER_KEY.to_string()))?;

        match category {
            SearchCategory::Writer | SearchCategory::Publisher => Ok(SearchOutcome {
                results: self.search_repertories(query, category).await,
                real_name: None,
            }),
            SearchCategory::Performer => {
                let real_name = resolver.resolve(query).await;

                let results = match (&real_name, self.requery_performers) {
                    (Some(name), true) => self
                        .search_repertories(name, SearchCategory::Writer)
                        .await
                        .into_iter()
                        .map(|r| SearchResult {
                            category: SearchCategory::Performer,
                            ..r
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                Ok(SearchOutcome {
                    results,
                    real_name: Some(real_name),
                })
            }
        }
    }

    /// Run one search and wrap it in the response envelope
    pub async fn handle(&self, query: &str, category: SearchCategory) -> SearchResponse {
        match self.search(query, category).await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                warn!(query = %query, category = %category, error = %e, "Search failed");
                SearchResponse::failure(error_message(&e))
            }
        }
    }

    /// Query every adapter concurrently and concatenate, no cross-source merge
    async fn search_repertories(&self, query: &str, category: SearchCategory) -> Vec<SearchResult> {
        let batches = join_all(self.adapters.iter().map(|a| a.search(query, category))).await;
        let results: Vec<SearchResult> = batches.into_iter().flatten().collect();

        info!(
            query = %query,
            category = %category,
            repertories = self.adapters.len(),
            records = results.len(),
            "Repertory searches joined"
        );
        results
    }
}

/// Client-facing message: configuration and input errors verbatim
pub fn error_message(error: &Error) -> String {
    match error {
        Error::Config(msg) | Error::InvalidInput(msg) => msg.clone(),
        other => other.to_string(),
    }
}
