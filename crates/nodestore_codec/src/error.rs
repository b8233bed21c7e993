//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during snapshot encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The snapshot text is not valid JSON.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// A node key could not be parsed.
    #[error("invalid node key: {text}")]
    InvalidKey {
        /// The offending key text.
        text: String,
    },

    /// The snapshot document has an unexpected shape.
    #[error("invalid snapshot structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },
}

impl CodecError {
    /// Creates an invalid key error.
    pub fn invalid_key(text: impl Into<String>) -> Self {
        Self::InvalidKey { text: text.into() }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
