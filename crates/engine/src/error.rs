//! Error types for the lifecycle, ingestion and build layers
//!
//! Each layer reports through its own enum; [`BuildError`] is the umbrella a
//! whole build session returns. Every variant names the repository path,
//! parameter key, document class or document id it concerns.

use std::io;
use std::path::PathBuf;

use docket_core::{DocumentId, Error, MetadataError, SourceError};
use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Repository lifecycle failures
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The session already made its one transition
    #[error("lifecycle already transitioned (state: {state})")]
    AlreadyTransitioned {
        /// State reached by the earlier transition
        state: LifecycleState,
    },

    /// Operation requires an open repository
    #[error("repository is not open (state: {state})")]
    NotOpen {
        /// Current state
        state: LifecycleState,
    },

    /// `OpenExisting` found no manifest at the path
    #[error("no repository manifest at {}", path.display())]
    MissingManifest {
        /// Repository path
        path: PathBuf,
    },

    /// The engine failed to create, open or recover the repository
    #[error("failed to {operation} repository at {}: {source}", path.display())]
    Repository {
        /// Repository path
        path: PathBuf,
        /// Engine operation that failed
        operation: &'static str,
        /// Engine error
        #[source]
        source: Error,
    },

    /// Fetching or applying a class schema failed
    #[error("schema reconciliation failed for class '{class}': {source}")]
    Schema {
        /// Document class
        class: String,
        /// Engine error
        #[source]
        source: Error,
    },

    /// Registering a corpus path failed
    #[error("failed to register {kind} path {}: {source}", path.display())]
    PathRegistration {
        /// Which path was being registered
        kind: &'static str,
        /// Path value
        path: PathBuf,
        /// Engine error
        #[source]
        source: Error,
    },

    /// Ingestion requested before a document root was registered
    #[error("document root must be registered before ingestion")]
    DocumentRootNotSet,
}

/// Per-document ingestion failures
#[derive(Debug, Error)]
pub enum IngestError {
    /// Adding a file failed
    #[error("failed to add {}: {source}", path.display())]
    AddFile {
        /// Document path
        path: PathBuf,
        /// Engine error
        #[source]
        source: Error,
    },

    /// Adding an in-memory document failed
    #[error("failed to add {class} document from string: {source}")]
    AddString {
        /// Document class
        class: String,
        /// Engine error
        #[source]
        source: Error,
    },

    /// A metadata set with unwritten slots was handed to `add_string`
    #[error("invalid metadata for {class} document: {source}")]
    InvalidMetadataState {
        /// Document class
        class: String,
        /// Slot error
        #[source]
        source: MetadataError,
    },

    /// Deleting a document failed
    #[error("failed to delete {id}: {source}")]
    Delete {
        /// Document id
        id: DocumentId,
        /// Engine error
        #[source]
        source: Error,
    },

    /// Walking the corpus hit an I/O error other than a vanished entry
    #[error("corpus walk failed at {}: {source}", path.display())]
    Walk {
        /// Entry being visited
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Closing the repository failed
    #[error("failed to close repository: {0}")]
    Close(#[source] Error),
}

/// Build session failures
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required parameter is absent
    #[error("missing required parameter '{key}'")]
    MissingRequiredParameter {
        /// Parameter path
        key: String,
    },

    /// Parameter files or arguments could not be loaded
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The engine rejected the repository options
    #[error("failed to configure engine: {0}")]
    Configure(#[source] Error),

    /// Lifecycle transition, reconciliation or path registration failed
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Document ingestion failed
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl BuildError {
    /// Parameter key for a missing required parameter
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            BuildError::MissingRequiredParameter { key } => Some(key),
            _ => None,
        }
    }
}
