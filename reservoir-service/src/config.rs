//! Service configuration.
//!
//! Settings are read once at startup from a YAML file and may be overridden
//! by environment variables.
//!
//! ## Sources
//!
//! | Source | Description |
//! |--------|-------------|
//! | `CONFIG_PATH` | Path of the YAML file (default `./config/config.yaml`) |
//! | `RESERVOIR__<SECTION>__<KEY>` | Overrides a single key, e.g. `RESERVOIR__MYSQL__PASSWORD` |
//!
//! `RESERVOIR__HTTP_SERVER__ALLOWED_ORIGINS` takes a comma-separated list.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reservoir::StorageConfig;
use serde::Deserialize;
use thiserror::Error;

/// Config file used when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.yaml";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "RESERVOIR";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("Config file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be parsed or a value has the wrong type.
    #[error("Cannot read config: {0}")]
    Load(#[from] config::ConfigError),
}

/// Deployment environment. Selects log format and verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Developer machine: human-readable multi-line logs at debug level.
    Local,
    /// Shared development: compact text logs at debug level.
    Dev,
    /// Production: JSON logs at info level.
    Prod,
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub env: Env,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    pub mysql: StorageConfig,
}

/// HTTP listener and request handling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:9010`.
    #[serde(default = "default_address")]
    pub address: String,
    /// Upper bound on handling a whole request. Keep it above
    /// `query_timeout` so storage deadlines surface as a 500 envelope.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// Deadline shared by the storage calls of one request.
    #[serde(default = "default_query_timeout", with = "humantime_serde")]
    pub query_timeout: Duration,
    /// First path segment of the readings route.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_address() -> String {
    "0.0.0.0:9010".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_route_prefix() -> String {
    "ac-wh-1000xm5".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout: default_timeout(),
            query_timeout: default_query_timeout(),
            route_prefix: default_route_prefix(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Load configuration from `CONFIG_PATH`, or [`DEFAULT_CONFIG_PATH`].
pub fn load() -> Result<Config, ConfigError> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_from(path)
}

/// Load configuration from a YAML file plus environment overrides.
///
/// # Errors
///
/// Returns an error if the file is missing, cannot be parsed, or lacks a
/// required key (`env`, `mysql`).
pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("http_server.allowed_origins"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
