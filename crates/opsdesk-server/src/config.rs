//! Server configuration loaded from TOML.
//!
//! ```toml
//! [database]
//! url = "127.0.0.1:8000"
//! namespace = "opsdesk"
//!
//! [access]
//! safe_default_path = "/dashboard"
//! lookup_timeout_ms = 3000
//!
//! [probe]
//! actor_id = "6f1c0a9e-3a55-4d0c-9a57-0d3f8f4c2b11"
//! tool_key = "crm"
//! ```

use std::path::{Path, PathBuf};

use opsdesk_access::AccessConfig;
use opsdesk_db::DbConfig;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Environment variable naming the config file when no path argument is
/// given.
pub const CONFIG_ENV: &str = "OPSDESK_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database: DbConfig,
    pub access: AccessConfig,
    /// One-shot access check run at startup.
    pub probe: Option<ProbeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    pub actor_id: Uuid,
    pub tool_key: String,
}

impl ServerConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config path from the first CLI argument, then [`CONFIG_ENV`].
    pub fn path_from_env() -> Option<PathBuf> {
        std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }
}
