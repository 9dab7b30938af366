//! # Configuration
//!
//! Layered runtime configuration. Each setting is taken from the first
//! source that provides it:
//!
//! 1. CLI flag
//! 2. Environment (`CONDOSCOPE_*`)
//! 3. `condoscope.toml`
//! 4. Built-in default
//!
//! ## File format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! rate_limit = 100
//! cors_origins = ["http://localhost:3000"]
//!
//! [storage]
//! backend = "redb"
//! database = "condoscope.db"
//! ```
//!
//! Unknown keys are rejected. The API key is read from the environment only.

use clap::ValueEnum;
use condoscope_core::CondoscopeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "condoscope.toml";

/// Largest config file accepted (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const DEFAULT_DATABASE: &str = "condoscope.db";

// =============================================================================
// BACKEND
// =============================================================================

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON dataset file loaded into memory.
    File,
    /// redb database (ACID, persistent).
    #[default]
    Redb,
}

impl Backend {
    fn parse(raw: &str) -> Result<Self, CondoscopeError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            other => Err(CondoscopeError::Config(format!(
                "Unknown backend '{}'. Use: file, redb",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Redb => f.write_str("redb"),
        }
    }
}

// =============================================================================
// FILE LAYER
// =============================================================================

/// Contents of `condoscope.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileConfig {
    pub server: ServerSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub rate_limit: Option<u32>,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StorageSection {
    pub backend: Option<Backend>,
    pub database: Option<PathBuf>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, CondoscopeError> {
        toml::from_str(text).map_err(|e| CondoscopeError::Config(format!("Invalid config: {}", e)))
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `./condoscope.toml` is read
    /// when present and silently skipped otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CondoscopeError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let metadata = std::fs::metadata(&path).map_err(|e| {
            CondoscopeError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CondoscopeError::Config(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(&path).map_err(|e| {
            CondoscopeError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Self::parse(&text)
    }
}

// =============================================================================
// CLI LAYER
// =============================================================================

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub backend: Option<Backend>,
    pub database: Option<PathBuf>,
}

// =============================================================================
// RESOLVED CONFIG
// =============================================================================

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// `None` = localhost only; `["*"]` = any origin.
    pub cors_origins: Option<Vec<String>>,
    pub backend: Backend,
    pub database: PathBuf,
    /// Bearer key required by the API when set.
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
            backend: Backend::default(),
            database: PathBuf::from(DEFAULT_DATABASE),
            api_key: None,
        }
    }
}

impl Config {
    /// Resolve against the process environment.
    pub fn from_sources(file: FileConfig, cli: CliOverrides) -> Result<Self, CondoscopeError> {
        Self::resolve(file, |key| std::env::var(key).ok(), cli)
    }

    /// Merge the layers. `lookup_env` reads one environment variable.
    pub fn resolve(
        file: FileConfig,
        lookup_env: impl Fn(&str) -> Option<String>,
        cli: CliOverrides,
    ) -> Result<Self, CondoscopeError> {
        let env = |key: &str| {
            lookup_env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let env_port = env("CONDOSCOPE_PORT")
            .map(|v| parse_number::<u16>("CONDOSCOPE_PORT", &v))
            .transpose()?;
        let env_rate_limit = env("CONDOSCOPE_RATE_LIMIT")
            .map(|v| parse_number::<u32>("CONDOSCOPE_RATE_LIMIT", &v))
            .transpose()?;
        let env_backend = env("CONDOSCOPE_BACKEND")
            .map(|v| Backend::parse(&v))
            .transpose()?;
        let env_origins = env("CONDOSCOPE_CORS_ORIGINS").map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            host: cli
                .host
                .or_else(|| env("CONDOSCOPE_HOST"))
                .or(file.server.host)
                .unwrap_or(defaults.host),
            port: cli
                .port
                .or(env_port)
                .or(file.server.port)
                .unwrap_or(defaults.port),
            rate_limit: env_rate_limit
                .or(file.server.rate_limit)
                .unwrap_or(defaults.rate_limit),
            cors_origins: env_origins.or(file.server.cors_origins),
            backend: cli
                .backend
                .or(env_backend)
                .or(file.storage.backend)
                .unwrap_or(defaults.backend),
            database: cli
                .database
                .or_else(|| env("CONDOSCOPE_DATABASE").map(PathBuf::from))
                .or(file.storage.database)
                .unwrap_or(defaults.database),
            api_key: env("CONDOSCOPE_API_KEY"),
        })
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CondoscopeError> {
    raw.parse()
        .map_err(|_| CondoscopeError::Config(format!("{} must be a number, got '{}'", key, raw)))
}

// =============================================================================
// TESTS
// =============================================================================
