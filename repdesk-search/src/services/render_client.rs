//! Page-rendering provider client
//!
//! Repertory search pages only show results after client-side rendering and a
//! disclaimer click, so pages are fetched through a hosted headless-browser
//! scrape API. One request carries the target URL, the wanted output formats
//! and a scripted interaction (waits and in-page JavaScript); the answer holds
//! markdown, raw HTML and the return values of the scripts.
//!
//! [`PageRenderer`] is the seam adapters and the resolver depend on, so tests
//! can substitute canned pages.

use async_trait::async_trait;
use repdesk_common::config::RenderConfig;
use repdesk_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("repdesk/", env!("CARGO_PKG_VERSION"));
const PROVIDER: &str = "Render provider";

/// One step of the in-browser interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderAction {
    /// Pause for a fixed time
    Wait { milliseconds: u64 },
    /// Run a script in the page; its return value is reported back
    ExecuteJavascript { script: String },
}

/// Scrape request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub url: String,
    pub formats: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<RenderAction>,
    pub only_main_content: bool,
}

impl RenderRequest {
    /// Markdown and HTML of `url`, no interaction
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            formats: vec!["markdown".to_string(), "html".to_string()],
            actions: Vec::new(),
            only_main_content: false,
        }
    }

    pub fn with_actions(mut self, actions: Vec<RenderAction>) -> Self {
        self.actions = actions;
        self
    }
}

/// Rendered output of one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedPage {
    pub markdown: String,
    pub html: String,
    /// Return values of `ExecuteJavascript` actions, in action order
    pub script_returns: Vec<serde_json::Value>,
}

/// Anything that can turn a [`RenderRequest`] into a [`RenderedPage`]
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage>;
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    actions: Option<ScrapeActions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeActions {
    #[serde(default)]
    javascript_returns: Vec<JavascriptReturn>,
}

#[derive(Debug, Deserialize)]
struct JavascriptReturn {
    #[serde(default)]
    value: serde_json::Value,
}

/// HTTP client for the hosted scrape API
pub struct RenderClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RenderClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        // Provider-side waits plus page load can take a while
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from config and an already-resolved key
    pub fn from_config(config: &RenderConfig, api_key: String) -> Result<Self> {
        Self::new(config.endpoint.clone(), api_key)
    }
}

#[async_trait]
impl PageRenderer for RenderClient {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage> {
        tracing::debug!(
            url = %request.url,
            actions = request.actions.len(),
            "Requesting rendered page"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::upstream(PROVIDER, 0, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::upstream(PROVIDER, status.as_u16(), error_text));
        }

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| {
                Error::upstream(PROVIDER, status.as_u16(), format!("Parse error: {}", e))
            })?;

        into_page(body, status.as_u16())
    }
}

fn into_page(body: ScrapeResponse, status: u16) -> Result<RenderedPage> {
    if !body.success {
        return Err(Error::upstream(
            PROVIDER,
            status,
            body.error.unwrap_or_else(|| "scrape unsuccessful".to_string()),
        ));
    }

    let data = body.data.unwrap_or_default();
    Ok(RenderedPage {
        markdown: data.markdown.unwrap_or_default(),
        html: data.html.unwrap_or_default(),
        script_returns: data
            .actions
            .map(|a| a.javascript_returns.into_iter().map(|r| r.value).collect())
            .unwrap_or_default(),
    })
}
