//! Bootstrap configuration loading, root folder resolution and provider
//! credential resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`REPDESK_*`)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! The TOML file is optional. Every table in it is optional and falls back to
//! the defaults below.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "REPDESK_CONFIG";
/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "REPDESK_ROOT_FOLDER";
/// Environment variable holding the page-rendering provider key
pub const RENDER_API_KEY_ENV: &str = "REPDESK_RENDER_API_KEY";
/// Environment variable holding the mail provider key
pub const MAIL_API_KEY_ENV: &str = "REPDESK_MAIL_API_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "repdesk.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database (optional)
    pub root_folder: Option<PathBuf>,

    /// HTTP server port (optional, CLI/ENV/default otherwise)
    pub port: Option<u16>,

    pub logging: LoggingConfig,
    pub render: RenderConfig,
    pub mail: MailConfig,
    pub search: SearchConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Page-rendering provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub api_key: Option<String>,
    /// Scrape endpoint URL
    pub endpoint: String,
    /// Fixed delay before and after the disclaimer click, in milliseconds
    pub wait_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.firecrawl.dev/v1/scrape".to_string(),
            wait_ms: 3000,
        }
    }
}

/// Outbound mail provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    /// Sender address used for every split sheet
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.resend.com/emails".to_string(),
            from: "Split Sheets <onboarding@resend.dev>".to_string(),
        }
    }
}

/// Search behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Repertories queried for writer/publisher searches
    pub repertories: Vec<String>,
    /// Re-query the writer index with a performer's resolved legal name
    pub requery_performers: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            repertories: vec!["BMI".to_string(), "ASCAP".to_string()],
            requery_performers: false,
        }
    }
}

/// Locate the TOML config file
///
/// CLI path, then `REPDESK_CONFIG`, then `<config_dir>/repdesk/repdesk.toml`.
/// Returns `None` when no candidate exists; an explicitly named file that does
/// not exist is still returned so loading reports it.
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("repdesk").join("repdesk.toml"))
        .filter(|p| p.exists())
}

/// Load the TOML config, or defaults when no file is configured
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Root folder resolution
///
/// 1. Command-line argument
/// 2. `REPDESK_ROOT_FOLDER`
/// 3. TOML `root_folder`
/// 4. OS-dependent default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("repdesk"))
        .unwrap_or_else(|| PathBuf::from("./repdesk_data"))
}

/// Create the root folder if missing and return the database path inside it
pub fn prepare_root_folder(root_folder: &Path) -> Result<PathBuf> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(root_folder.join(DATABASE_FILE))
}

/// Validate a credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve a provider credential from ENV, then TOML
///
/// Returns `None` when neither source holds a valid key. Callers decide
/// whether that is fatal for their code path.
pub fn resolve_secret(env_var: &str, toml_value: Option<&str>, label: &str) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k)).map(str::to_string);

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in both environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Some(key.trim().to_string());
    }

    warn!("{} API key not configured (set {} or the TOML config)", label, env_var);
    None
}
