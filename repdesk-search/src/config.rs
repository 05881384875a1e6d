//! Service wiring from bootstrap configuration
//!
//! Resolves provider credentials (ENV → TOML) and builds the search
//! orchestrator and split-sheet notifier with those credentials injected.
//! A missing credential does not stop startup; the affected code path reports
//! a configuration error on every call instead.

use repdesk_common::config::{
    resolve_secret, TomlConfig, MAIL_API_KEY_ENV, RENDER_API_KEY_ENV,
};
use repdesk_common::Result;
use std::sync::Arc;
use tracing::info;

use crate::services::{
    MailClient, MailTransport, PageRenderer, RenderClient, Repertory, SearchOrchestrator,
    SplitSheetNotifier,
};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5790;

/// CLI/ENV port, then TOML, then default
pub fn resolve_port(cli_port: Option<u16>, toml_config: &TomlConfig) -> u16 {
    cli_port.or(toml_config.port).unwrap_or(DEFAULT_PORT)
}

/// Parse the configured repertory list
pub fn configured_repertories(toml_config: &TomlConfig) -> Result<Vec<Repertory>> {
    toml_config
        .search
        .repertories
        .iter()
        .map(|name| name.parse())
        .collect()
}

/// Build the search orchestrator, with a renderer only if a key resolves
pub fn build_search_orchestrator(toml_config: &TomlConfig) -> Result<SearchOrchestrator> {
    let repertories = configured_repertories(toml_config)?;

    let renderer: Option<Arc<dyn PageRenderer>> = match resolve_secret(
        RENDER_API_KEY_ENV,
        toml_config.render.api_key.as_deref(),
        "Render provider",
    ) {
        Some(key) => {
            let client = RenderClient::from_config(&toml_config.render, key)?;
            Some(Arc::new(client) as Arc<dyn PageRenderer>)
        }
        None => None,
    };

    info!(
        repertories = ?repertories.iter().map(Repertory::name).collect::<Vec<_>>(),
        configured = renderer.is_some(),
        requery_performers = toml_config.search.requery_performers,
        "Search orchestrator ready"
    );

    Ok(SearchOrchestrator::new(
        renderer,
        &repertories,
        toml_config.render.wait_ms,
        toml_config.search.requery_performers,
    ))
}

/// Build the split-sheet notifier, with a transport only if a key resolves
pub fn build_notifier(toml_config: &TomlConfig) -> Result<SplitSheetNotifier> {
    let transport: Option<Arc<dyn MailTransport>> = match resolve_secret(
        MAIL_API_KEY_ENV,
        toml_config.mail.api_key.as_deref(),
        "Mail provider",
    ) {
        Some(key) => {
            let client = MailClient::from_config(&toml_config.mail, key)?;
            Some(Arc::new(client) as Arc<dyn MailTransport>)
        }
        None => None,
    };

    Ok(SplitSheetNotifier::new(transport, toml_config.mail.from.clone()))
}
