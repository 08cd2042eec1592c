//! Configuration loading
//!
//! Bootstrap settings (database path, bind address, log level) resolve per
//! field in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error; the service starts on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_DATABASE_PATH: &str = "WIZARDS_DATABASE_PATH";
pub const ENV_HOST: &str = "WIZARDS_HOST";
pub const ENV_PORT: &str = "WIZARDS_PORT";
pub const ENV_LOG_LEVEL: &str = "WIZARDS_LOG_LEVEL";

const APP_DIR: &str = "schedule-wizards";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to the compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from a file; `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

        Self::from_toml_str(&content).map(Some)
    }
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("./wizards_data"));

        Self {
            database_path: data_dir.join("wizards.db"),
            host: "127.0.0.1".to_string(),
            port: 5780,
            log_level: "info".to_string(),
        }
    }
}

/// Default location of the TOML file (`<config dir>/schedule-wizards/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Where the TOML tier came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The default path was checked and nothing was there
    Missing(PathBuf),
    /// The platform has no config directory
    NoConfigDir,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config file: {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("No config file at {}; using defaults", path.display())
            }
            ConfigSource::NoConfigDir => warn!("No config directory on this platform; using defaults"),
        }
    }
}

/// Fully resolved settings the service runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Settings {
    /// Resolve settings from CLI, environment, TOML file and defaults
    ///
    /// An explicit `--config` path that does not exist is a configuration
    /// error; the default path being absent is not. Logs nothing: report the
    /// returned [`ConfigSource`] once tracing is up.
    pub fn resolve(cli: &CliOverrides) -> Result<(Self, ConfigSource)> {
        let (toml_config, source) = match &cli.config_path {
            Some(path) => {
                let config = TomlConfig::load(path)?.ok_or_else(|| {
                    Error::Config(format!("Config file not found: {}", path.display()))
                })?;
                (config, ConfigSource::File(path.clone()))
            }
            None => match default_config_path() {
                Some(path) => match TomlConfig::load(&path)? {
                    Some(config) => (config, ConfigSource::File(path)),
                    None => (TomlConfig::default(), ConfigSource::Missing(path)),
                },
                None => (TomlConfig::default(), ConfigSource::NoConfigDir),
            },
        };

        let settings = Self::merge(cli, &toml_config, &CompiledDefaults::for_current_platform())?;
        Ok((settings, source))
    }

    /// Merge the four tiers without touching the filesystem
    pub fn merge(
        cli: &CliOverrides,
        toml_config: &TomlConfig,
        defaults: &CompiledDefaults,
    ) -> Result<Self> {
        let database_path = cli
            .database_path
            .clone()
            .or_else(|| std::env::var(ENV_DATABASE_PATH).ok().map(PathBuf::from))
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or_else(|| defaults.database_path.clone());

        let host = cli
            .host
            .clone()
            .or_else(|| std::env::var(ENV_HOST).ok())
            .or_else(|| toml_config.server.host.clone())
            .unwrap_or_else(|| defaults.host.clone());

        let port = match cli.port {
            Some(port) => port,
            None => match std::env::var(ENV_PORT) {
                Ok(raw) => raw.parse::<u16>().map_err(|_| {
                    Error::Config(format!("{} is not a valid port: {}", ENV_PORT, raw))
                })?,
                Err(_) => toml_config.server.port.unwrap_or(defaults.port),
            },
        };

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| std::env::var(ENV_LOG_LEVEL).ok())
            .or_else(|| toml_config.logging.level.clone())
            .unwrap_or_else(|| defaults.log_level.clone());

        Ok(Self {
            database_path,
            host,
            port,
            log_level,
        })
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
