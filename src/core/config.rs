//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.footprints/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use clap::ValueEnum;
use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Backend;
use crate::store::backends::remote::DEFAULT_API_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub backend: Option<Backend>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RemoteConfig {
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LocalConfig {
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// JSON file replacing the builtin country table.
    pub path: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const APP_DIR_NAME: &str = ".footprints";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: Backend,
    pub api_url: String,
    pub data_dir: PathBuf,
    pub dataset_path: Option<PathBuf>,
    pub log_level: LevelFilter,
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

/// Returns `~/.footprints/`, or `./.footprints/` without a home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
}

/// Returns the path to `~/.footprints/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DIR_NAME).join("config.toml"))
}

/// Load config from `~/.footprints/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TrackerConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TrackerConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TrackerConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<TrackerConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(TrackerConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TrackerConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Footprints Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# backend = "local"                  # "local" or "remote" (FOOTPRINTS_BACKEND)
# log_level = "debug"                # "error", "warn", "info", "debug", "trace"

# [remote]
# api_url = "http://localhost:3000/api"   # Or set FOOTPRINTS_API_URL

# [local]
# data_dir = "/home/me/.footprints/data"  # Or set FOOTPRINTS_DATA_DIR

# [dataset]
# path = "countries.json"            # Relative to ~/.footprints/ (FOOTPRINTS_DATASET)
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
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
/// `cli_backend` comes from the `--backend` flag (None = not specified).
pub fn resolve(config: &TrackerConfig, cli_backend: Option<Backend>) -> ResolvedConfig {
    // Backend: CLI → env → config → default
    let backend = cli_backend
        .or_else(|| {
            std::env::var("FOOTPRINTS_BACKEND")
                .ok()
                .and_then(|s| match Backend::from_str(&s, true) {
                    Ok(b) => Some(b),
                    Err(_) => {
                        warn!("Ignoring unknown FOOTPRINTS_BACKEND value {:?}", s);
                        None
                    }
                })
        })
        .or(config.general.backend)
        .unwrap_or_default();

    // API URL: env → config → default
    let api_url = std::env::var("FOOTPRINTS_API_URL")
        .ok()
        .or_else(|| config.remote.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    // Data dir: env → config → ~/.footprints/data
    let data_dir = std::env::var("FOOTPRINTS_DATA_DIR")
        .ok()
        .or_else(|| config.local.data_dir.clone())
        .map(PathBuf::from)
        .unwrap_or_else(|| app_dir().join("data"));

    // Dataset override: env → config; relative paths live under the app dir
    let dataset_path = std::env::var("FOOTPRINTS_DATASET")
        .ok()
        .or_else(|| config.dataset.path.clone())
        .map(|p| {
            let p = PathBuf::from(p);
            if p.is_relative() { app_dir().join(p) } else { p }
        });

    let log_level = match config.general.log_level.as_deref() {
        Some(level) => level.parse().unwrap_or_else(|_| {
            warn!("Unknown log_level {:?}, using {}", level, DEFAULT_LOG_LEVEL);
            DEFAULT_LOG_LEVEL
        }),
        None => DEFAULT_LOG_LEVEL,
    };

    ResolvedConfig {
        backend,
        api_url,
        data_dir,
        dataset_path,
        log_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = TrackerConfig::default();
        assert!(config.general.backend.is_none());
        assert!(config.remote.api_url.is_none());
        assert!(config.dataset.path.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = TrackerConfig {
            general: GeneralConfig {
                backend: Some(Backend::Remote),
                log_level: Some("warn".to_string()),
            },
            local: LocalConfig {
                data_dir: Some("/tmp/footprints-test".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, None);
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        if std::env::var("FOOTPRINTS_BACKEND").is_err() {
            assert_eq!(resolved.backend, Backend::Remote);
        }
        if std::env::var("FOOTPRINTS_DATA_DIR").is_err() {
            assert_eq!(resolved.data_dir, PathBuf::from("/tmp/footprints-test"));
        }
    }

    #[test]
    fn test_resolve_cli_backend_wins() {
        let config = TrackerConfig {
            general: GeneralConfig {
                backend: Some(Backend::Remote),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some(Backend::Local));
        assert_eq!(resolved.backend, Backend::Local);
    }

    #[test]
    fn test_resolve_bad_log_level_falls_back() {
        let config = TrackerConfig {
            general: GeneralConfig {
                log_level: Some("chatty".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, None).log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_relative_dataset_path_lives_under_app_dir() {
        let config = TrackerConfig {
            dataset: DatasetConfig {
                path: Some("countries.json".to_string()),
            },
            ..Default::default()
        };
        if std::env::var("FOOTPRINTS_DATASET").is_err() {
            let resolved = resolve(&config, None);
            assert_eq!(resolved.dataset_path, Some(app_dir().join("countries.json")));
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
backend = "remote"
log_level = "info"

[remote]
api_url = "http://192.168.1.100:3000/api"

[local]
data_dir = "/var/lib/footprints"

[dataset]
path = "/etc/footprints/countries.json"
"#;
        let config: TrackerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.backend, Some(Backend::Remote));
        assert_eq!(
            config.remote.api_url.as_deref(),
            Some("http://192.168.1.100:3000/api")
        );
        assert_eq!(config.local.data_dir.as_deref(), Some("/var/lib/footprints"));
        assert_eq!(
            config.dataset.path.as_deref(),
            Some("/etc/footprints/countries.json")
        );
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[remote]
api_url = "http://example.test/api"
"#;
        let config: TrackerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.remote.api_url.as_deref(), Some("http://example.test/api"));
        assert!(config.general.backend.is_none());
        assert!(config.local.data_dir.is_none());
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let toml_str = r#"
[general]
backend = "carrier-pigeon"
"#;
        assert!(toml::from_str::<TrackerConfig>(toml_str).is_err());
    }

    #[test]
    fn test_missing_file_generates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.general.backend.is_none());

        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.starts_with("# Footprints Configuration"));
        // Everything in the generated file is commented out
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.remote.api_url.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\nbackend = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
