//! EduHub client configuration.
//!
//! TOML-based configuration with defaults for every field, an environment
//! override for the API base URL, and validation.
//!
//! ```rust,no_run
//! let config = eduhub_config::load_config(None).expect("failed to load config");
//! println!("{}", config.api.base_url);
//! ```

pub mod paths;
pub mod schema;
pub mod toml_loader;
pub mod validation;

use std::path::Path;

pub use schema::{
    ApiConfig, EduhubConfig, LoggingConfig, MessagesConfig, SessionConfig, CONFIG_SCHEMA_VERSION,
};

use eduhub_common::ConfigError;

/// Environment variable that replaces `api.base_url`.
pub const API_URL_ENV: &str = "EDUHUB_API_URL";

/// Load config from `path` if given, otherwise from the platform default
/// location. Applies environment overrides and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<EduhubConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validation::validate(&config)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut EduhubConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(base_url = %url, "api.base_url overridden from environment");
        config.api.base_url = url.trim().to_string();
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &EduhubConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
