//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Everything lives under `~/.pocket-manager/`. If `config.toml` is missing
//! on first run, a commented-out default is generated so users can discover
//! all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pocket::DEFAULT_BASE_URL;
use crate::probe::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pocket: PocketConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PocketConfig {
    pub consumer_key: Option<String>,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProbeConfig {
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub consumer_key: Option<String>,
    pub access_token: Option<String>,
    pub base_url: String,
    pub probe_concurrency: usize,
    pub probe_timeout: Duration,
}

/// CLI flags that override the file and environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides {
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Data Paths
// ============================================================================

pub const DATA_DIR_NAME: &str = ".pocket-manager";

/// Files kept in the app data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub dir: PathBuf,
    pub store: PathBuf,
    pub state: PathBuf,
    pub config: PathBuf,
    pub log: PathBuf,
}

impl DataPaths {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            store: dir.join("links.json"),
            state: dir.join("state"),
            config: dir.join("config.toml"),
            log: dir.join("pocketmanager.log"),
            dir,
        }
    }

    /// `~/.pocket-manager/`, or `None` without a home directory.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|h| Self::new(h.join(DATA_DIR_NAME)))
    }
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

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AppConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Probe config: {:?}", config.probe);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Pocket Manager Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [pocket]
# consumer_key = "12345-abcdef"       # Or set POCKET_CONSUMER_KEY env var
# access_token = "a1b2c3-..."         # Or set POCKET_ACCESS_TOKEN env var
# base_url = "https://getpocket.com/v3"

# [probe]
# concurrency = 100                   # simultaneous link checks
# timeout_secs = 10                   # per-link timeout
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = create_data_dir(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

/// Create the data directory (and missing parents), readable by the owner
/// only. It holds the access token and the store.
#[cfg(unix)]
pub fn create_data_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
pub fn create_data_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AppConfig, cli: CliOverrides) -> ResolvedConfig {
    // Credentials: env → config
    let consumer_key = std::env::var("POCKET_CONSUMER_KEY")
        .ok()
        .or_else(|| config.pocket.consumer_key.clone());
    let access_token = std::env::var("POCKET_ACCESS_TOKEN")
        .ok()
        .or_else(|| config.pocket.access_token.clone());

    // Base URL: env → config → default
    let base_url = std::env::var("POCKET_BASE_URL")
        .ok()
        .or_else(|| config.pocket.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Probe limits: CLI → config → default
    let probe_concurrency = cli
        .concurrency
        .or(config.probe.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY)
        .max(1);
    let probe_timeout = cli
        .timeout_secs
        .or(config.probe.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    ResolvedConfig {
        consumer_key,
        access_token,
        base_url,
        probe_concurrency,
        probe_timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&AppConfig::default(), CliOverrides::default());
        assert_eq!(resolved.probe_concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(resolved.probe_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_resolve_cli_wins_over_file() {
        let config = AppConfig {
            probe: ProbeConfig {
                concurrency: Some(20),
                timeout_secs: Some(3),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, CliOverrides::default());
        assert_eq!(resolved.probe_concurrency, 20);
        assert_eq!(resolved.probe_timeout, Duration::from_secs(3));

        let cli = CliOverrides {
            concurrency: Some(5),
            timeout_secs: None,
        };
        let resolved = resolve(&config, cli);
        assert_eq!(resolved.probe_concurrency, 5);
        assert_eq!(resolved.probe_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_zero_concurrency_is_raised_to_one() {
        let cli = CliOverrides {
            concurrency: Some(0),
            timeout_secs: None,
        };
        assert_eq!(resolve(&AppConfig::default(), cli).probe_concurrency, 1);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[pocket]
consumer_key = "1234-abcd"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pocket.consumer_key.as_deref(), Some("1234-abcd"));
        assert!(config.pocket.access_token.is_none());
        assert!(config.probe.concurrency.is_none());
    }

    #[test]
    fn test_load_config_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = load_config(&path).unwrap();
        assert!(config.pocket.consumer_key.is_none());
        assert!(path.exists());

        // The generated file is all comments, so it loads as defaults.
        let reloaded = load_config(&path).unwrap();
        assert!(reloaded.probe.timeout_secs.is_none());
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[probe]\nconcurrency = \"many\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_data_paths_layout() {
        let paths = DataPaths::new(PathBuf::from("/tmp/pm"));
        assert_eq!(paths.store, PathBuf::from("/tmp/pm/links.json"));
        assert_eq!(paths.state, PathBuf::from("/tmp/pm/state"));
        assert_eq!(paths.config, PathBuf::from("/tmp/pm/config.toml"));
    }
}
