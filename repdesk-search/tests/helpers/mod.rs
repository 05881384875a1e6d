//! Shared test doubles for the search service
//!
//! Canned renderer and recording mailer so the HTTP surface can be exercised
//! without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use repdesk_common::{Error, Result};
use repdesk_search::services::{
    MailTransport, OutboundEmail, PageRenderer, RenderRequest, RenderedPage, Repertory,
    SearchOrchestrator, SplitSheetNotifier,
};
use repdesk_search::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

pub const SNOOP_ARTICLE: &str = "\
# Snoop Dogg

| Snoop Dogg | |
|---|---|
| Born | Calvin Cordozar Broadus Jr.<br>October 20, 1971 (age 53)<br>Long Beach, California, U.S. |
| Occupations | Rapper, singer, songwriter |

**Calvin Cordozar Broadus Jr.** (born October 20, 1971), known professionally as Snoop Dogg, is an American rapper.";

/// Renderer answering from a table of URL fragments
///
/// The first fragment contained in the requested URL wins; an unmatched URL
/// or a fragment mapped to `None` fails like an unreachable provider.
#[derive(Default)]
pub struct StubRenderer {
    pages: Vec<(String, Option<RenderedPage>)>,
    requests: Mutex<Vec<RenderRequest>>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url_fragment: &str, page: RenderedPage) -> Self {
        self.pages.push((url_fragment.to_string(), Some(page)));
        self
    }

    pub fn failing(mut self, url_fragment: &str) -> Self {
        self.pages.push((url_fragment.to_string(), None));
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage> {
        self.requests.lock().unwrap().push(request.clone());

        match self.pages.iter().find(|(fragment, _)| request.url.contains(fragment)) {
            Some((_, Some(page))) => Ok(page.clone()),
            Some((_, None)) => Err(Error::upstream("Render provider", 500, "stub failure")),
            None => Err(Error::upstream("Render provider", 404, "no stub page")),
        }
    }
}

/// Page whose DOM scan returned `(name, ipi)` pairs
pub fn scanned_page(entries: &[(&str, &str)]) -> RenderedPage {
    let scanned: Vec<Value> = entries
        .iter()
        .map(|(name, ipi)| json!({ "name": name, "ipi": ipi }))
        .collect();

    RenderedPage {
        markdown: String::new(),
        html: String::new(),
        script_returns: vec![json!(true), Value::Array(scanned)],
    }
}

/// Page with only markdown content
pub fn markdown_page(markdown: &str) -> RenderedPage {
    RenderedPage {
        markdown: markdown.to_string(),
        ..Default::default()
    }
}

/// Mail transport that records messages, or rejects everything
#[derive(Default)]
pub struct StubMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    reject: bool,
}

impl StubMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for StubMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        if self.reject {
            return Err(Error::upstream("Mail provider", 422, "invalid recipient"));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// In-memory database with the schema applied
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    repdesk_search::db::init_tables(&pool)
        .await
        .expect("Should create tables");
    pool
}

/// Router wired to the given doubles; `None` means unconfigured
pub async fn test_app(
    renderer: Option<Arc<StubRenderer>>,
    mailer: Option<Arc<StubMailer>>,
) -> axum::Router {
    test_app_with(renderer, mailer, false).await
}

pub async fn test_app_with(
    renderer: Option<Arc<StubRenderer>>,
    mailer: Option<Arc<StubMailer>>,
    requery_performers: bool,
) -> axum::Router {
    let renderer = renderer.map(|r| r as Arc<dyn PageRenderer>);
    let mailer = mailer.map(|m| m as Arc<dyn MailTransport>);

    let search = SearchOrchestrator::new(renderer, &Repertory::ALL, 0, requery_performers);
    let notifier = SplitSheetNotifier::new(mailer, "splits@example.com");

    build_router(AppState::new(test_pool().await, search, notifier))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}
