//! Error types for the node store.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in node store operations.
///
/// Lookup misses are not errors: `get_node` and `resolve` return `None`
/// for absent nodes, and a missing snapshot file on load yields a fresh
/// empty store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A constraint or cascade violation.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable description of the violation.
        message: String,
    },

    /// Snapshot I/O failure other than "file does not exist".
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),

    /// Snapshot encoding or decoding failure.
    #[error("codec error: {0}")]
    Codec(#[from] nodestore_codec::CodecError),

    /// No entity with the given type is defined in the schema.
    #[error("unknown entity type: {type_ref}")]
    UnknownEntity {
        /// Full name of the missing type.
        type_ref: String,
    },

    /// The entity defines no relationship with the given name.
    #[error("unknown relationship {name} on {entity}")]
    UnknownRelationship {
        /// Full name of the entity.
        entity: String,
        /// The missing relationship name.
        name: String,
    },
}

impl StoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unknown entity error.
    pub fn unknown_entity(type_ref: impl Into<String>) -> Self {
        Self::UnknownEntity {
            type_ref: type_ref.into(),
        }
    }

    /// Creates an unknown relationship error.
    pub fn unknown_relationship(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownRelationship {
            entity: entity.into(),
            name: name.into(),
        }
    }
}
