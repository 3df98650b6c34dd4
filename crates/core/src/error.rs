//! Error types for the engine boundary
//!
//! Every [`IndexEngine`](crate::traits::IndexEngine) operation reports
//! failures through [`Error`]. Variants carry the path, document class or
//! document identifier needed to locate the failing call.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metadata::MetadataError;
use crate::types::DocumentId;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by an index engine
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on a repository or document path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// On-disk state failed validation
    #[error("Data corruption at {}: {reason}", path.display())]
    Corruption {
        /// Offending file
        path: PathBuf,
        /// What failed
        reason: String,
    },

    /// Call made in the wrong state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// No document class given and none could be inferred
    #[error("Unknown document class for {}", path.display())]
    UnknownDocumentClass {
        /// Document path
        path: PathBuf,
    },

    /// Document id was never assigned or is already deleted
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Metadata set with unwritten slots handed to the engine
    #[error("Invalid metadata state: {0}")]
    InvalidMetadataState(#[from] MetadataError),

    /// Schema fetch or update rejected
    #[error("Schema error for class '{class}': {reason}")]
    Schema {
        /// Document class
        class: String,
        /// What failed
        reason: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for an I/O error of kind `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
