//! Configuration schema types for the EduHub client.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EduhubConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub messages: MessagesConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix for every relative request path.
    pub base_url: String,
    pub connect_timeout_secs: u64,
    /// Route the UI is sent to when the session expires.
    pub login_route: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".into(),
            connect_timeout_secs: 10,
            login_route: "/login".into(),
        }
    }
}

/// Identity cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the cached identity is persisted. `None` means the platform
    /// data directory (see [`crate::paths::identity_file`]).
    pub cache_file: Option<PathBuf>,
}

/// Direct-message view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub poll_interval_ms: u64,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "eduhub=info".into(),
        }
    }
}
