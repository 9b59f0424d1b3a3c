//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.campusguide/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::credentials::CredentialStore;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CampusGuideConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub typing_delay_ms: Option<u64>,
    pub sidebar_open: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub token_file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TYPING_DELAY_MS: u64 = 500;
pub const BASE_URL_ENV: &str = "CAMPUSGUIDE_BASE_URL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    /// None = no client-side timeout.
    pub request_timeout: Option<Duration>,
    pub typing_delay: Duration,
    pub sidebar_open: bool,
    pub token_path: PathBuf,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.campusguide/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".campusguide").join("config.toml"))
}

/// Load config from `~/.campusguide/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `CampusGuideConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<CampusGuideConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(CampusGuideConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<CampusGuideConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(CampusGuideConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: CampusGuideConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# CampusGuide Configuration
# All settings are optional; defaults fill in anything left out.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:8000"   # Or set CAMPUSGUIDE_BASE_URL, or pass --server
# request_timeout_secs = 60            # Unset = no client-side timeout

# [ui]
# typing_delay_ms = 500                # Delay before the typing indicator appears
# sidebar_open = true

# [auth]
# token_file = "token"                 # Path relative to ~/.campusguide/
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_server` is the `--server` flag (None = not specified).
pub fn resolve(config: &CampusGuideConfig, cli_server: Option<&str>) -> ResolvedConfig {
    resolve_from(config, cli_server, std::env::var(BASE_URL_ENV).ok())
}

/// [`resolve`] with the environment value passed in.
pub fn resolve_from(
    config: &CampusGuideConfig,
    cli_server: Option<&str>,
    env_base_url: Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_server
        .map(|s| s.to_string())
        .or(env_base_url)
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let request_timeout = config
        .server
        .request_timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let typing_delay = Duration::from_millis(
        config
            .ui
            .typing_delay_ms
            .unwrap_or(DEFAULT_TYPING_DELAY_MS),
    );

    ResolvedConfig {
        base_url,
        request_timeout,
        typing_delay,
        sidebar_open: config.ui.sidebar_open.unwrap_or(true),
        token_path: resolve_token_path(config),
    }
}

/// Token file: relative paths are anchored at `~/.campusguide/`.
fn resolve_token_path(config: &CampusGuideConfig) -> PathBuf {
    let default = || CredentialStore::default_path().unwrap_or_else(|| PathBuf::from(".campusguide-token"));
    match config.auth.token_file.as_deref() {
        Some(file) if Path::new(file).is_absolute() => PathBuf::from(file),
        Some(file) => match dirs::home_dir() {
            Some(home) => home.join(".campusguide").join(file),
            None => PathBuf::from(file),
        },
        None => default(),
    }
}
