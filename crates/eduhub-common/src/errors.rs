use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures reading or writing the persisted identity cache entry.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The stored entry exists but is not a valid serialized identity.
    #[error("malformed identity cache: {0}")]
    Malformed(String),

    #[error("identity cache io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EduhubError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Network(String),
}
