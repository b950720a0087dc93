//! Configuration error types.

/// Errors raised while loading, saving, or collecting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record exists but is not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The user declined to create a missing configuration record.
    #[error("configuration record creation declined")]
    SetupDeclined,

    /// Interactive input was requested but no input source is attached.
    #[error("no interactive input available: {0}")]
    InputUnavailable(String),
}
