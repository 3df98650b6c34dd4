//! Collaborator traits for index engines and progress reporting
//!
//! [`IndexEngine`] is the boundary to the component that physically stores
//! an index. The lifecycle and ingestion layers only ever talk to an engine
//! through this trait, so tests inject faulty engines instead of flipping
//! global switches.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::metadata::MetadataPair;
use crate::schema::SchemaSpec;
use crate::types::{DocumentId, IndexOptions};

/// Lifecycle and status notifications from an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A fresh repository was created
    Created(PathBuf),
    /// An existing repository was opened
    Opened(PathBuf),
    /// A repository was recovered after an unclean shutdown
    Recovered(PathBuf),
    /// Free-form status line
    Status(String),
    /// The repository is being closed
    Closing,
    /// The session finished with these counters
    Finished {
        /// Documents seen
        seen: u64,
        /// Documents indexed
        indexed: u64,
    },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Created(path) => write!(f, "repository created at {}", path.display()),
            ProgressEvent::Opened(path) => write!(f, "repository opened at {}", path.display()),
            ProgressEvent::Recovered(path) => {
                write!(f, "repository recovered at {}", path.display())
            }
            ProgressEvent::Status(line) => f.write_str(line),
            ProgressEvent::Closing => f.write_str("closing repository"),
            ProgressEvent::Finished { seen, indexed } => {
                write!(f, "finished: {} documents seen, {} indexed", seen, indexed)
            }
        }
    }
}

/// Observer of progress events
///
/// Sinks are purely observational; they cannot influence the operation
/// that reports to them.
pub trait ProgressSink {
    /// Receive one event
    fn report(&mut self, event: ProgressEvent);
}

/// Storage and parsing engine behind a repository
///
/// One engine instance serves one repository path at a time. All calls are
/// synchronous.
pub trait IndexEngine: Send {
    /// Apply repository-wide options; must precede `create`/`open`
    fn configure(&mut self, options: &IndexOptions) -> Result<()>;

    /// Whether a manifest marker exists at `path`
    fn manifest_exists(&self, path: &Path) -> bool;

    /// Try to bring a crashed repository back to a consistent state
    ///
    /// `Ok(false)` is a negative outcome, not an error: the repository at
    /// `path` cannot be recovered and should be recreated.
    fn recover_repository(&mut self, path: &Path) -> Result<bool>;

    /// Create a fresh repository, discarding anything already at `path`
    fn create(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()>;

    /// Open an existing repository
    fn open(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()>;

    /// Stored schema for a document class, `None` if the class is unknown
    fn schema_spec(&self, class: &str) -> Result<Option<SchemaSpec>>;

    /// Replace the stored schema for `spec.class`
    fn apply_schema_spec(&mut self, spec: &SchemaSpec) -> Result<()>;

    /// Directory documents are added relative to
    fn set_document_root(&mut self, path: &Path) -> Result<()>;

    /// Location of anchor text (inlinks) for the corpus
    fn set_anchor_text_path(&mut self, path: &Path) -> Result<()>;

    /// Location of offset annotations for the corpus
    fn set_offset_annotations_path(&mut self, path: &Path) -> Result<()>;

    /// Location of offset metadata for the corpus
    fn set_offset_metadata_path(&mut self, path: &Path) -> Result<()>;

    /// Add a file; with `class` omitted it is inferred from the extension
    fn add_file(&mut self, path: &Path, class: Option<&str>) -> Result<DocumentId>;

    /// Add an in-memory document with fully written metadata
    fn add_string(
        &mut self,
        content: &str,
        class: &str,
        metadata: &[MetadataPair],
    ) -> Result<DocumentId>;

    /// Mark a document deleted
    fn delete_document(&mut self, id: DocumentId) -> Result<()>;

    /// Documents ever added
    fn documents_seen(&self) -> u64;

    /// Documents added and not deleted
    fn documents_indexed(&self) -> u64;

    /// Flush and release the repository
    fn close(&mut self) -> Result<()>;
}
