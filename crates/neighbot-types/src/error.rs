use thiserror::Error;

/// Errors from the context store and its persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("context '{0}' not found")]
    NotFound(String),

    #[error("channel '{channel}' is already claimed by context '{context}'")]
    ChannelClaimed { channel: String, context: String },

    #[error("invalid context id '{0}': must be a single path component")]
    InvalidId(String),

    #[error("filesystem error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Errors from adapter registration, configuration and lifecycle.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter not found: {0}")]
    NotFound(String),

    #[error("invalid adapter name: '{0}'")]
    InvalidName(String),

    #[error("invalid config type for adapter '{adapter}'")]
    ConfigMismatch { adapter: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing required configuration: {0}")]
    MissingConfig(String),

    #[error("cannot move adapter from {from} to {to}")]
    InvalidState { from: String, to: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Errors reading or writing the main configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {message}")]
    Read { path: String, message: String },

    #[error("malformed config '{path}': {message}")]
    Malformed { path: String, message: String },

    #[error("failed to write config '{path}': {message}")]
    Write { path: String, message: String },
}
