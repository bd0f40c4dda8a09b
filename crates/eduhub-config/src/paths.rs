use std::path::PathBuf;

use eduhub_common::ConfigError;

pub(crate) const APP_NAME: &str = "eduhub";

/// Returns the platform-specific configuration directory.
///
/// - macOS: `~/Library/Application Support/eduhub`
/// - Linux: `$XDG_CONFIG_HOME/eduhub` (defaults to `~/.config/eduhub`)
/// - Windows: `%APPDATA%\eduhub`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory.
///
/// - macOS: `~/Library/Application Support/eduhub`
/// - Linux: `$XDG_DATA_HOME/eduhub` (defaults to `~/.local/share/eduhub`)
/// - Windows: `%APPDATA%\eduhub`
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the path to the main configuration file.
///
/// Located at `config_dir()/config.toml`.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Returns the path to the persisted identity cache.
///
/// Located at `data_dir()/identity.json`.
pub fn identity_file() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("identity.json"))
}
