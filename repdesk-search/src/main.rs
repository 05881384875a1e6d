//! repdesk-search - Music rights search service
//!
//! Searches performing-rights repertories for writers and publishers, resolves
//! performers' legal names, keeps a saved-records collection and mails split
//! sheets.

use anyhow::Result;
use clap::Parser;
use repdesk_common::config::{
    config_file_path, load_toml_config, prepare_root_folder, resolve_root_folder,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repdesk_search::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "repdesk-search")]
#[command(about = "Music rights repertory search service")]
#[command(version)]
struct Args {
    /// HTTP port
    #[arg(short, long, env = "REPDESK_PORT")]
    port: Option<u16>,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its logging level can seed the filter
    let config_path = config_file_path(args.config.as_deref());
    let toml_config = load_toml_config(config_path.as_deref())?;

    // RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting repdesk-search v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using defaults"),
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = prepare_root_folder(&root_folder)?;
    info!("Database: {}", db_path.display());

    let db_pool = repdesk_search::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let search = repdesk_search::config::build_search_orchestrator(&toml_config)?;
    let notifier = repdesk_search::config::build_notifier(&toml_config)?;

    let state = AppState::new(db_pool, search, notifier);
    let app = build_router(state);

    let port = repdesk_search::config::resolve_port(args.port, &toml_config);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
