//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default Madek instance
pub const DEFAULT_ADDRESS: &str = "https://medienarchiv.zhdk.ch";

/// Default listen address of the HTTP server
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default tracing level
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_ADDRESS: &str = "MADEK_ADDRESS";
pub const ENV_USERNAME: &str = "MADEK_USERNAME";
pub const ENV_PASSWORD: &str = "MADEK_PASSWORD";
pub const ENV_BIND: &str = "MADEK_BIND";
pub const ENV_LOG_LEVEL: &str = "MADEK_LOG";

/// Contents of `config.toml`
///
/// All keys are optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bind: Option<String>,
    /// Cache whole compiled responses in server mode
    pub cache: Option<bool>,
    /// Upper bound on collection pages; unbounded when absent
    pub max_pages: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    /// Log every API request at info level
    pub log_requests: Option<bool>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[logging]` table of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bind: Option<String>,
    pub log_level: Option<String>,
    /// `--cache` flag; it can only switch caching on
    pub cache: bool,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bind: String,
    pub cache: bool,
    pub max_pages: Option<u32>,
    pub request_timeout: Option<Duration>,
    pub log_requests: bool,
    pub log_level: String,
}

impl Settings {
    /// Resolve settings from command line, environment and TOML config
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let address = resolve_value(cli.address.as_deref(), ENV_ADDRESS, toml.address.as_deref())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        validate_address(&address)?;

        let username = resolve_value(
            cli.username.as_deref(),
            ENV_USERNAME,
            toml.username.as_deref(),
        );
        let password = resolve_value(
            cli.password.as_deref(),
            ENV_PASSWORD,
            toml.password.as_deref(),
        );
        if password.is_some() && username.is_none() {
            return Err(Error::Config("password given without a username".to_string()));
        }

        if toml.max_pages == Some(0) {
            return Err(Error::Config(
                "max_pages must be at least 1; omit it for unbounded pagination".to_string(),
            ));
        }

        let bind = resolve_value(cli.bind.as_deref(), ENV_BIND, toml.bind.as_deref())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let log_level = resolve_value(
            cli.log_level.as_deref(),
            ENV_LOG_LEVEL,
            toml.logging.level.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            address: address.trim_end_matches('/').to_string(),
            username,
            password,
            bind,
            cache: cli.cache || toml.cache.unwrap_or(false),
            max_pages: toml.max_pages,
            request_timeout: toml.request_timeout_secs.map(Duration::from_secs),
            log_requests: toml.log_requests.unwrap_or(false),
            log_level,
        })
    }
}

/// Pick the first non-empty value among CLI argument, environment variable
/// and TOML entry
fn resolve_value(cli: Option<&str>, env_var: &str, toml: Option<&str>) -> Option<String> {
    if let Some(value) = cli.filter(|v| !v.trim().is_empty()) {
        return Some(value.to_string());
    }

    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return Some(value);
        }
    }

    toml.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

fn validate_address(address: &str) -> Result<()> {
    if address.starts_with("http://") || address.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "address must start with http:// or https://, got {:?}",
            address
        )))
    }
}

/// Locate the default configuration file for the platform
///
/// Linux tries `~/.config/madek/config.toml`, then `/etc/madek/config.toml`.
/// Other platforms use the user configuration directory only.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("madek").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/madek/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load the TOML config
///
/// An explicit `path` must exist. Without one, the platform default is used
/// when present; a missing default file yields an empty config.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                debug!("No config file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}
