//! Configuration loading.
//!
//! Configuration is resolved from three places, lowest priority first:
//! 1. **Defaults** - the serde `default` functions below
//! 2. **File** - YAML from `--config`, `$TASKHOLD_CONFIG_PATH`,
//!    `./taskhold.yaml`, or `~/.taskhold/config.yaml` (first found wins)
//! 3. **Environment** - `TASKHOLD_*` variables override file values
//!
//! ## Environment Variables
//! - `TASKHOLD_CONFIG_PATH` - Explicit config file
//! - `TASKHOLD_DB_PATH` - Database path
//! - `TASKHOLD_PORT` - HTTP listen port
//! - `TASKHOLD_IDENTITY_HEADER` - Header carrying the authenticated user id
//! - `TASKHOLD_CRON_TOKEN` - Bearer token required by the cleanup endpoint
//! - `TASKHOLD_RETENTION_DAYS` - Trash retention window in days

use crate::retention::DEFAULT_RETENTION_DAYS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 31780;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

/// HTTP server and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Port the HTTP server listens on (default: 31780).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            port: default_port(),
        }
    }
}

/// Identity and trigger authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Request header carrying the authenticated user id, injected by the
    /// identity-aware proxy in front of this server (default: `x-user-id`).
    #[serde(default = "default_identity_header")]
    pub identity_header: String,

    /// Optional bearer token the cleanup endpoint requires. When unset the
    /// endpoint is open (suitable when the scheduler runs on localhost).
    #[serde(default)]
    pub cron_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_header: default_identity_header(),
            cron_token: None,
        }
    }
}

/// Trash retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Days a trashed task is kept before the sweep removes it (default: 30).
    #[serde(default = "default_retention_days")]
    pub days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_retention_days(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("taskhold.db")
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

fn default_retention_days() -> i64 {
    DEFAULT_RETENTION_DAYS
}

impl Config {
    /// Load configuration: explicit path, then env path, then the standard
    /// file locations, then apply environment overrides on top.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit_path {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("TASKHOLD_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }
        let project = PathBuf::from("taskhold.yaml");
        if project.exists() {
            return Some(project);
        }
        if let Some(home) = dirs::home_dir() {
            let user = home.join(".taskhold").join("config.yaml");
            if user.exists() {
                return Some(user);
            }
        }
        None
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TASKHOLD_DB_PATH") {
            self.server.db_path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var("TASKHOLD_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(header) = std::env::var("TASKHOLD_IDENTITY_HEADER") {
            self.auth.identity_header = header.to_lowercase();
        }
        if let Ok(token) = std::env::var("TASKHOLD_CRON_TOKEN") {
            self.auth.cron_token = Some(token);
        }
        if let Ok(days) = std::env::var("TASKHOLD_RETENTION_DAYS")
            && let Ok(days) = days.parse()
        {
            self.retention.days = days;
        }
    }

    /// Ensure the parent directory of the database path exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
        Ok(())
    }
}
