//! Service configuration
//!
//! A JSON document with five sections. Every field has a default, so a
//! partial file (or no file at all) yields a runnable configuration:
//!
//! ```json
//! {
//!   "server": { "host": "127.0.0.1", "port": 8080 },
//!   "knot": { "knotc_path": "/usr/sbin/knotc", "allowed_zones": ["example.com"] },
//!   "auth": { "enabled": true, "api_keys": ["secret"] },
//!   "log": { "level": "info", "format": "json", "output": "stdout" },
//!   "rate_limit": { "enabled": true, "max_requests": 100, "window_secs": 60 }
//! }
//! ```

mod errors;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use errors::{ConfigError, ConfigResult};

use crate::http_server::HttpServerConfig;

/// Log levels accepted in `log.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub knot: KnotConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// How to reach knotc and which zones it may touch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnotConfig {
    /// knotc binary (default: "/usr/sbin/knotc")
    #[serde(default = "default_knotc_path")]
    pub knotc_path: PathBuf,

    /// Control socket passed as `-s`; empty means knotc's own default
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    /// Zone allow-list; empty allows every zone
    #[serde(default)]
    pub allowed_zones: Vec<String>,

    /// Bound on each CRUD, listing and reload command (default: 10)
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Bound on the status probe (default: 5)
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

fn default_knotc_path() -> PathBuf {
    PathBuf::from("/usr/sbin/knotc")
}

fn default_socket_path() -> String {
    "/run/knot/knot.sock".to_string()
}

fn default_command_timeout() -> u64 {
    10
}

fn default_health_timeout() -> u64 {
    5
}

impl Default for KnotConfig {
    fn default() -> Self {
        Self {
            knotc_path: default_knotc_path(),
            socket_path: default_socket_path(),
            allowed_zones: Vec::new(),
            command_timeout_secs: default_command_timeout(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

impl KnotConfig {
    pub fn socket(&self) -> Option<PathBuf> {
        if self.socket_path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.socket_path))
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

/// API key authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub api_keys: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_keys: Vec::new(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// trace, debug, info, warn or error (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "json" or "text" (default: "json")
    #[serde(default = "default_log_format")]
    pub format: String,

    /// "stdout", "stderr" or a file path (default: "stdout")
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
        }
    }
}

/// Per-client request limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_requests() -> usize {
    100
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl AppConfig {
    /// Load configuration from `path`, or defaults when no path is given
    /// or the file does not exist.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and enumerations
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be between 1 and 65535"));
        }
        if self.knot.knotc_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("knot.knotc_path", "cannot be empty"));
        }
        if self.knot.command_timeout_secs == 0 {
            return Err(ConfigError::invalid("knot.command_timeout_secs", "must be > 0"));
        }
        if self.knot.health_timeout_secs == 0 {
            return Err(ConfigError::invalid("knot.health_timeout_secs", "must be > 0"));
        }
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "log.level",
                format!("unknown level '{}'", self.log.level),
            ));
        }
        if self.rate_limit.enabled {
            if self.rate_limit.max_requests == 0 {
                return Err(ConfigError::invalid("rate_limit.max_requests", "must be > 0"));
            }
            if self.rate_limit.window_secs == 0 {
                return Err(ConfigError::invalid("rate_limit.window_secs", "must be > 0"));
            }
        }
        Ok(())
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
