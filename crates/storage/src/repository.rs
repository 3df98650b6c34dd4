//! File-backed repository
//!
//! `FileRepository` implements the [`IndexEngine`] boundary on a plain
//! directory: a manifest marker, per-class schemas, the session options,
//! and a journal of document adds and deletes that the counters are
//! rebuilt from on open. Term extraction and postings are out of scope;
//! documents are recorded, optionally stored, and counted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use docket_core::classes;
use docket_core::{
    canonical_name, DocumentId, Error, IndexEngine, IndexOptions, MetadataPair, ProgressEvent,
    ProgressSink, Result, SchemaSpec,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::format::{
    read_journal, write_atomic, Journal, JournalError, JournalRecord, ManifestError,
    ManifestManager,
};
use crate::paths::RepositoryPaths;

/// Live document bookkeeping rebuilt from the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTable {
    seen: u64,
    live: BTreeSet<DocumentId>,
    next_id: u64,
}

impl Default for DocumentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTable {
    /// Empty table; the first id handed out is 1
    pub fn new() -> Self {
        DocumentTable {
            seen: 0,
            live: BTreeSet::new(),
            next_id: 1,
        }
    }

    /// Rebuild from journal records, rejecting contradictions
    pub fn replay(records: &[JournalRecord]) -> std::result::Result<Self, JournalError> {
        let mut table = DocumentTable::new();
        for (i, record) in records.iter().enumerate() {
            match record {
                JournalRecord::Add { id, .. } => {
                    if id.as_u64() < table.next_id {
                        return Err(JournalError::Inconsistent {
                            line: i + 1,
                            message: format!("{} was already assigned", id),
                        });
                    }
                    table.next_id = id.as_u64() + 1;
                    table.insert(*id);
                }
                JournalRecord::Delete { id } => {
                    if !table.remove(*id) {
                        return Err(JournalError::Inconsistent {
                            line: i + 1,
                            message: format!("{} is not live", id),
                        });
                    }
                }
            }
        }
        Ok(table)
    }

    fn allocate(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, id: DocumentId) {
        self.seen += 1;
        self.live.insert(id);
    }

    fn remove(&mut self, id: DocumentId) -> bool {
        self.live.remove(&id)
    }

    /// Whether `id` is added and not deleted
    pub fn contains(&self, id: DocumentId) -> bool {
        self.live.contains(&id)
    }

    /// Documents ever added
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Documents added and not deleted
    pub fn indexed(&self) -> u64 {
        self.live.len() as u64
    }
}

#[derive(Debug)]
struct Session {
    paths: RepositoryPaths,
    lock: File,
    manifest: ManifestManager,
    journal: Journal,
    schemas: BTreeMap<String, SchemaSpec>,
    document_root: Option<PathBuf>,
    anchor_text: Option<PathBuf>,
    offset_annotations: Option<PathBuf>,
    offset_metadata: Option<PathBuf>,
}

/// Repository stored in a local directory
#[derive(Debug, Default)]
pub struct FileRepository {
    options: IndexOptions,
    session: Option<Session>,
    documents: DocumentTable,
}

impl FileRepository {
    /// A closed repository handle with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a repository is currently open
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Path of the open repository
    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.paths.root())
    }

    /// Options in effect
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// UUID of the open repository
    pub fn repository_uuid(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| s.manifest.manifest().uuid_string())
    }

    /// Registered document root
    pub fn document_root(&self) -> Option<&Path> {
        self.session.as_ref()?.document_root.as_deref()
    }

    /// Registered anchor text path
    pub fn anchor_text_path(&self) -> Option<&Path> {
        self.session.as_ref()?.anchor_text.as_deref()
    }

    /// Registered offset annotations path
    pub fn offset_annotations_path(&self) -> Option<&Path> {
        self.session.as_ref()?.offset_annotations.as_deref()
    }

    /// Registered offset metadata path
    pub fn offset_metadata_path(&self) -> Option<&Path> {
        self.session.as_ref()?.offset_metadata.as_deref()
    }

    /// Stored content of a live document, `None` if it was not stored
    pub fn stored_content(&self, id: DocumentId) -> Result<Option<Vec<u8>>> {
        let session = self.session()?;
        if !self.documents.contains(id) {
            return Err(Error::DocumentNotFound(id));
        }
        let path = session.paths.doc(id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(not_open)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or_else(not_open)
    }

    fn ensure_closed(&self) -> Result<()> {
        match &self.session {
            Some(session) => Err(Error::InvalidOperation(format!(
                "repository at '{}' is still open",
                session.paths.root().display()
            ))),
            None => Ok(()),
        }
    }

    fn record_document(
        &mut self,
        class: String,
        source: Option<String>,
        metadata: Vec<MetadataPair>,
        content: &[u8],
    ) -> Result<DocumentId> {
        let stored = self.options.store_docs;
        let session = self.session.as_mut().ok_or_else(not_open)?;
        let id = DocumentId(self.documents.next_id);

        if stored {
            let doc_path = session.paths.doc(id);
            fs::write(&doc_path, content).map_err(|e| Error::io(&doc_path, e))?;
        }

        let record = JournalRecord::Add {
            id,
            class,
            source,
            metadata,
            stored,
        };
        let journal_path = session.paths.journal();
        session
            .journal
            .append(&record)
            .map_err(|e| journal_error(&journal_path, e))?;

        let assigned = self.documents.allocate();
        self.documents.insert(assigned);
        Ok(assigned)
    }
}

impl IndexEngine for FileRepository {
    fn configure(&mut self, options: &IndexOptions) -> Result<()> {
        self.ensure_closed()?;
        let mut options = options.clone();
        for field in &mut options.fields {
            field.name = canonical_name(&field.name);
        }
        options.forward = options.forward.iter().map(|n| canonical_name(n)).collect();
        options.backward = options.backward.iter().map(|n| canonical_name(n)).collect();
        self.options = options;
        Ok(())
    }

    fn manifest_exists(&self, path: &Path) -> bool {
        ManifestManager::exists(&RepositoryPaths::from_root(path).manifest())
    }

    fn recover_repository(&mut self, path: &Path) -> Result<bool> {
        self.ensure_closed()?;
        let paths = RepositoryPaths::from_root(path);
        let manifest_path = paths.manifest();

        match ManifestManager::load(manifest_path.clone()) {
            Ok(_) => {}
            Err(ManifestError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    target: "docket::storage",
                    path = %path.display(),
                    "No manifest to recover from"
                );
                return Ok(false);
            }
            Err(ManifestError::Io(e)) => return Err(Error::io(&manifest_path, e)),
            Err(e) => {
                warn!(
                    target: "docket::storage",
                    path = %path.display(),
                    error = %e,
                    "Manifest is corrupt"
                );
                return Ok(false);
            }
        }

        let _lock = lock_repository(&paths)?;

        match load_schemas(&paths.schema()) {
            Ok(_) => {}
            Err(Error::Corruption { reason, .. }) => {
                warn!(
                    target: "docket::storage",
                    path = %path.display(),
                    error = %reason,
                    "Schema store is corrupt"
                );
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        let journal_path = paths.journal();
        let replay = match read_journal(&journal_path) {
            Ok(replay) => replay,
            Err(JournalError::Io(e)) => return Err(Error::io(&journal_path, e)),
            Err(e) => {
                warn!(
                    target: "docket::storage",
                    path = %path.display(),
                    error = %e,
                    "Journal cannot be replayed"
                );
                return Ok(false);
            }
        };

        if let Err(e) = DocumentTable::replay(&replay.records) {
            warn!(
                target: "docket::storage",
                path = %path.display(),
                error = %e,
                "Journal cannot be replayed"
            );
            return Ok(false);
        }

        if replay.has_torn_tail() {
            warn!(
                target: "docket::storage",
                path = %journal_path.display(),
                bytes = replay.original_size - replay.valid_end,
                "Truncating torn journal tail"
            );
            Journal::truncate_to(&journal_path, replay.valid_end)
                .map_err(|e| journal_error(&journal_path, e))?;
        }

        info!(
            target: "docket::storage",
            path = %path.display(),
            records = replay.records.len(),
            "Recovery complete"
        );
        Ok(true)
    }

    fn create(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()> {
        self.ensure_closed()?;
        let paths = RepositoryPaths::from_root(path);
        let lock = lock_repository(&paths)?;
        discard_contents(&paths)?;

        let docs_dir = paths.docs_dir();
        fs::create_dir_all(&docs_dir).map_err(|e| Error::io(&docs_dir, e))?;
        let schemas = BTreeMap::new();
        write_json(&paths.schema(), &schemas)?;
        write_json(&paths.options(), &self.options)?;

        let journal_path = paths.journal();
        let journal =
            Journal::create(journal_path.clone()).map_err(|e| journal_error(&journal_path, e))?;

        // Manifest goes last: its presence marks a finished create
        let manifest_path = paths.manifest();
        let manifest = ManifestManager::create(manifest_path.clone())
            .map_err(|e| manifest_error(&manifest_path, e))?;

        info!(
            target: "docket::storage",
            path = %path.display(),
            uuid = %manifest.manifest().uuid_string(),
            "Created repository"
        );

        self.documents = DocumentTable::new();
        self.session = Some(Session {
            paths,
            lock,
            manifest,
            journal,
            schemas,
            document_root: None,
            anchor_text: None,
            offset_annotations: None,
            offset_metadata: None,
        });
        progress.report(ProgressEvent::Created(path.to_path_buf()));
        Ok(())
    }

    fn open(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()> {
        self.ensure_closed()?;
        let paths = RepositoryPaths::from_root(path);
        let manifest_path = paths.manifest();
        if !ManifestManager::exists(&manifest_path) {
            return Err(Error::io(
                &manifest_path,
                io::Error::new(io::ErrorKind::NotFound, "repository manifest not found"),
            ));
        }

        let lock = lock_repository(&paths)?;
        let manifest = ManifestManager::load(manifest_path.clone())
            .map_err(|e| manifest_error(&manifest_path, e))?;
        let schemas = load_schemas(&paths.schema())?;

        let journal_path = paths.journal();
        let replay = read_journal(&journal_path).map_err(|e| journal_error(&journal_path, e))?;
        if replay.has_torn_tail() {
            warn!(
                target: "docket::storage",
                path = %journal_path.display(),
                "Truncating torn journal tail"
            );
            Journal::truncate_to(&journal_path, replay.valid_end)
                .map_err(|e| journal_error(&journal_path, e))?;
        }
        let documents =
            DocumentTable::replay(&replay.records).map_err(|e| journal_error(&journal_path, e))?;

        let docs_dir = paths.docs_dir();
        fs::create_dir_all(&docs_dir).map_err(|e| Error::io(&docs_dir, e))?;
        write_json(&paths.options(), &self.options)?;
        let journal =
            Journal::open(journal_path.clone()).map_err(|e| journal_error(&journal_path, e))?;

        info!(
            target: "docket::storage",
            path = %path.display(),
            seen = documents.seen(),
            indexed = documents.indexed(),
            "Opened repository"
        );

        self.documents = documents;
        self.session = Some(Session {
            paths,
            lock,
            manifest,
            journal,
            schemas,
            document_root: None,
            anchor_text: None,
            offset_annotations: None,
            offset_metadata: None,
        });
        progress.report(ProgressEvent::Opened(path.to_path_buf()));
        Ok(())
    }

    fn schema_spec(&self, class: &str) -> Result<Option<SchemaSpec>> {
        let session = self.session()?;
        let class = canonical_name(class);
        Ok(session
            .schemas
            .get(&class)
            .cloned()
            .or_else(|| classes::builtin(&class).map(|c| c.default_spec())))
    }

    fn apply_schema_spec(&mut self, spec: &SchemaSpec) -> Result<()> {
        let session = self.session_mut()?;
        let mut spec = spec.clone();
        spec.class = canonical_name(&spec.class);
        if spec.class.is_empty() {
            return Err(Error::Schema {
                class: spec.class,
                reason: "document class name is empty".to_string(),
            });
        }

        debug!(
            target: "docket::storage",
            class = %spec.class,
            fields = spec.fields.len(),
            forward = spec.forward.len(),
            backward = spec.backward.len(),
            "Applying schema"
        );
        session.schemas.insert(spec.class.clone(), spec);
        write_json(&session.paths.schema(), &session.schemas)
    }

    fn set_document_root(&mut self, path: &Path) -> Result<()> {
        self.session_mut()?.document_root = Some(path.to_path_buf());
        Ok(())
    }

    fn set_anchor_text_path(&mut self, path: &Path) -> Result<()> {
        self.session_mut()?.anchor_text = Some(path.to_path_buf());
        Ok(())
    }

    fn set_offset_annotations_path(&mut self, path: &Path) -> Result<()> {
        self.session_mut()?.offset_annotations = Some(path.to_path_buf());
        Ok(())
    }

    fn set_offset_metadata_path(&mut self, path: &Path) -> Result<()> {
        self.session_mut()?.offset_metadata = Some(path.to_path_buf());
        Ok(())
    }

    fn add_file(&mut self, path: &Path, class: Option<&str>) -> Result<DocumentId> {
        let session = self.session()?;
        let root = require_document_root(session)?;
        let class = match class {
            Some(class) => known_class(session, class)?,
            None => classes::infer_class(path)
                .map(str::to_string)
                .ok_or_else(|| Error::UnknownDocumentClass {
                    path: path.to_path_buf(),
                })?,
        };
        let source = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        let content = fs::read(path).map_err(|e| Error::io(path, e))?;

        let id = self.record_document(class, Some(source), Vec::new(), &content)?;
        debug!(target: "docket::storage", id = %id, path = %path.display(), "Added file");
        Ok(id)
    }

    fn add_string(
        &mut self,
        content: &str,
        class: &str,
        metadata: &[MetadataPair],
    ) -> Result<DocumentId> {
        let session = self.session()?;
        require_document_root(session)?;
        let class = known_class(session, class)?;

        let id = self.record_document(class, None, metadata.to_vec(), content.as_bytes())?;
        debug!(
            target: "docket::storage",
            id = %id,
            metadata = metadata.len(),
            "Added string document"
        );
        Ok(id)
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<()> {
        let session = self.session.as_mut().ok_or_else(not_open)?;
        if !self.documents.contains(id) {
            return Err(Error::DocumentNotFound(id));
        }

        let journal_path = session.paths.journal();
        session
            .journal
            .append(&JournalRecord::Delete { id })
            .map_err(|e| journal_error(&journal_path, e))?;

        let doc_path = session.paths.doc(id);
        match fs::remove_file(&doc_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&doc_path, e)),
        }

        self.documents.remove(id);
        debug!(target: "docket::storage", id = %id, "Deleted document");
        Ok(())
    }

    fn documents_seen(&self) -> u64 {
        self.documents.seen()
    }

    fn documents_indexed(&self) -> u64 {
        self.documents.indexed()
    }

    fn close(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let journal_path = session.paths.journal();
        session
            .journal
            .sync()
            .map_err(|e| journal_error(&journal_path, e))?;
        let lock_path = session.paths.lock();
        fs2::FileExt::unlock(&session.lock).map_err(|e| Error::io(&lock_path, e))?;
        info!(
            target: "docket::storage",
            path = %session.paths.root().display(),
            seen = self.documents.seen(),
            indexed = self.documents.indexed(),
            "Closed repository"
        );
        Ok(())
    }
}

fn not_open() -> Error {
    Error::InvalidOperation("repository is not open".to_string())
}

fn require_document_root(session: &Session) -> Result<&Path> {
    session.document_root.as_deref().ok_or_else(|| {
        Error::InvalidOperation("document root must be set before adding documents".to_string())
    })
}

fn known_class(session: &Session, class: &str) -> Result<String> {
    let name = canonical_name(class);
    if session.schemas.contains_key(&name) || classes::builtin(&name).is_some() {
        Ok(name)
    } else {
        Err(Error::Schema {
            class: class.to_string(),
            reason: "unknown document class".to_string(),
        })
    }
}

fn lock_repository(paths: &RepositoryPaths) -> Result<File> {
    let root = paths.root();
    fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;

    let lock_path = paths.lock();
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;
    fs2::FileExt::try_lock_exclusive(&lock_file).map_err(|_| {
        Error::InvalidOperation(format!(
            "repository at '{}' is already in use by another process",
            root.display()
        ))
    })?;
    Ok(lock_file)
}

fn discard_contents(paths: &RepositoryPaths) -> Result<()> {
    for path in paths.owned_entries() {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::io(&path, e)),
        };
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| Error::io(&path, e))?;
        debug!(target: "docket::storage", path = %path.display(), "Discarded prior content");
    }
    Ok(())
}

fn load_schemas(path: &Path) -> Result<BTreeMap<String, SchemaSpec>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(Error::io(path, e)),
    };
    serde_json::from_slice(&bytes).map_err(|e| Error::Corruption {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| Error::SerializationError(e.to_string()))?;
    write_atomic(path, &bytes).map_err(|e| Error::io(path, e))
}

fn manifest_error(path: &Path, e: ManifestError) -> Error {
    match e {
        ManifestError::Io(source) => Error::io(path, source),
        other => Error::Corruption {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

fn journal_error(path: &Path, e: JournalError) -> Error {
    match e {
        JournalError::Io(source) => Error::io(path, source),
        JournalError::Encode(message) => Error::SerializationError(message),
        other => Error::Corruption {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
