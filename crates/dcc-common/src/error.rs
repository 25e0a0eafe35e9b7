//! Error types shared by the DCC crates

use thiserror::Error;

/// Result type alias for common DCC operations
pub type Result<T> = std::result::Result<T, DccError>;

/// Main error type for the shared DCC utilities
#[derive(Error, Debug)]
pub enum DccError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to compute md5sum of '{path}': {source}")]
    Checksum {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid DCC mode '{0}': must be one of 'dev' or 'prod'")]
    InvalidMode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
