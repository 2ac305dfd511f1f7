//! Error handling types for celldap
//!
//! Errors only arise in the ambient layers (transport framing, configuration,
//! adapter process management, dump persistence). The message-rewriting core is
//! fail-open and never surfaces an error: a failed lookup leaves the original
//! field untouched.

use thiserror::Error;

/// Comprehensive error type for bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed wire frame on the DAP channel
    #[error("Malformed DAP frame: {message}")]
    Frame { message: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Debug adapter process could not be started
    #[error("Failed to spawn debug adapter `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Message serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Helper functions for common error patterns
impl BridgeError {
    /// Create a frame error
    pub fn frame(message: impl Into<String>) -> Self {
        BridgeError::Frame {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        BridgeError::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        BridgeError::Internal(message.into())
    }
}
