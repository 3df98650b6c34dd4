//! Document ingestion
//!
//! An [`IngestionPipeline`] is only obtainable from a lifecycle that is open
//! and has a registered document root, so documents can never be added
//! before the repository is ready.
//!
//! Counter invariant: `documents_indexed() <= documents_seen()` at all
//! times. A failed add or delete leaves the counters of earlier successful
//! operations untouched.

use std::io;
use std::path::{Path, PathBuf};

use docket_core::{DocumentId, IndexEngine, MetadataPairSet, ProgressEvent, ProgressSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::IngestError;

/// Outcome of a corpus walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkReport {
    /// Ids assigned to added files, in walk order
    pub added: Vec<DocumentId>,
    /// Entries that vanished between listing and adding
    pub skipped: u64,
}

/// Adds and deletes documents in an open repository
pub struct IngestionPipeline<E: IndexEngine> {
    engine: E,
    document_root: PathBuf,
}

impl<E: IndexEngine> IngestionPipeline<E> {
    pub(crate) fn new(engine: E, document_root: PathBuf) -> Self {
        IngestionPipeline {
            engine,
            document_root,
        }
    }

    /// Registered document root
    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Borrow the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Add one file; with `class` omitted the engine infers it
    pub fn add_file(
        &mut self,
        path: &Path,
        class: Option<&str>,
    ) -> Result<DocumentId, IngestError> {
        let id = self
            .engine
            .add_file(path, class)
            .map_err(|source| IngestError::AddFile {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(target: "docket::ingest", path = %path.display(), %id, "Added file");
        self.check_counters();
        Ok(id)
    }

    /// Add an in-memory document
    ///
    /// Every slot of `metadata` must have been written; a set with an
    /// unwritten slot is rejected before the engine sees it.
    pub fn add_string(
        &mut self,
        content: &str,
        class: &str,
        metadata: &MetadataPairSet,
    ) -> Result<DocumentId, IngestError> {
        let pairs = metadata
            .pairs()
            .map_err(|source| IngestError::InvalidMetadataState {
                class: class.to_string(),
                source,
            })?;
        let id = self
            .engine
            .add_string(content, class, &pairs)
            .map_err(|source| IngestError::AddString {
                class: class.to_string(),
                source,
            })?;
        debug!(
            target: "docket::ingest",
            class,
            %id,
            metadata = pairs.len(),
            "Added string document"
        );
        self.check_counters();
        Ok(id)
    }

    /// Mark a document deleted; `documents_seen` is unaffected
    pub fn delete_document(&mut self, id: DocumentId) -> Result<(), IngestError> {
        self.engine
            .delete_document(id)
            .map_err(|source| IngestError::Delete { id, source })?;
        debug!(target: "docket::ingest", %id, "Deleted document");
        self.check_counters();
        Ok(())
    }

    /// Documents ever added
    pub fn documents_seen(&self) -> u64 {
        self.engine.documents_seen()
    }

    /// Documents added and not deleted
    pub fn documents_indexed(&self) -> u64 {
        self.engine.documents_indexed()
    }

    /// Add every file under `root`
    ///
    /// Directories are skipped, as are entries that disappear between
    /// listing and adding (including a missing `root`). Any other I/O error
    /// aborts the walk; files added before it stay added.
    pub fn ingest_directory(
        &mut self,
        root: &Path,
        class: Option<&str>,
    ) -> Result<WalkReport, IngestError> {
        let mut report = WalkReport::default();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    let vanished = err
                        .io_error()
                        .map_or(false, |e| e.kind() == io::ErrorKind::NotFound);
                    if vanished {
                        debug!(target: "docket::ingest", path = %path.display(), "Entry vanished");
                        report.skipped += 1;
                        continue;
                    }
                    return Err(IngestError::Walk {
                        path,
                        source: err.into(),
                    });
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            match self.engine.add_file(entry.path(), class) {
                Ok(id) => report.added.push(id),
                Err(e) if e.is_not_found() => {
                    debug!(
                        target: "docket::ingest",
                        path = %entry.path().display(),
                        "File vanished before add"
                    );
                    report.skipped += 1;
                }
                Err(source) => {
                    warn!(
                        target: "docket::ingest",
                        path = %entry.path().display(),
                        error = %source,
                        "Corpus walk aborted"
                    );
                    return Err(IngestError::AddFile {
                        path: entry.path().to_path_buf(),
                        source,
                    });
                }
            }
        }

        self.check_counters();
        info!(
            target: "docket::ingest",
            root = %root.display(),
            added = report.added.len(),
            skipped = report.skipped,
            "Corpus walk complete"
        );
        Ok(report)
    }

    /// Flush and release the repository, reporting final counters
    pub fn close(&mut self, progress: &mut dyn ProgressSink) -> Result<(), IngestError> {
        progress.report(ProgressEvent::Closing);
        self.engine.close().map_err(IngestError::Close)?;
        progress.report(ProgressEvent::Finished {
            seen: self.documents_seen(),
            indexed: self.documents_indexed(),
        });
        Ok(())
    }

    /// Give the engine back
    pub fn into_engine(self) -> E {
        self.engine
    }

    fn check_counters(&self) {
        debug_assert!(
            self.engine.documents_indexed() <= self.engine.documents_seen(),
            "indexed count exceeds seen count"
        );
    }
}
