//! Outbound mail provider client
//!
//! Thin wrapper over a transactional-email HTTP API. [`MailTransport`] is the
//! seam the split-sheet notifier depends on.

use async_trait::async_trait;
use repdesk_common::config::MailConfig;
use repdesk_common::{Error, Result};
use serde::Serialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("repdesk/", env!("CARGO_PKG_VERSION"));
const PROVIDER: &str = "Mail provider";

/// One message as the provider expects it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Anything that can deliver an [`OutboundEmail`]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// HTTP client for the mail provider
pub struct MailClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl MailClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &MailConfig, api_key: String) -> Result<Self> {
        Self::new(config.endpoint.clone(), api_key)
    }
}

#[async_trait]
impl MailTransport for MailClient {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| Error::upstream(PROVIDER, 0, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                to = ?email.to,
                "Mail provider rejected message"
            );
            return Err(Error::upstream(PROVIDER, status.as_u16(), error_text));
        }

        tracing::debug!(to = ?email.to, subject = %email.subject, "Mail accepted by provider");
        Ok(())
    }
}
