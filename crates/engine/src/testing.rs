//! Test doubles for the [`IndexEngine`] boundary
//!
//! - [`MemoryEngine`]: an in-memory engine whose state is shared between
//!   clones, so a test can hand one clone to a lifecycle and inspect the
//!   other afterwards.
//! - [`FailingEngine`]: wraps another engine and fails one chosen operation,
//!   optionally after a number of successful calls to it.
//!
//! # Example
//!
//! ```ignore
//! use docket_engine::testing::{FailPoint, FailingEngine, MemoryEngine};
//!
//! let engine = MemoryEngine::with_manifest();
//! engine.set_recoverable(false);
//! let faulty = FailingEngine::new(engine.clone(), FailPoint::Create);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docket_core::classes::{self, infer_class};
use docket_core::{
    canonical_name, DocumentId, Error, IndexEngine, IndexOptions, MetadataPair, ProgressEvent,
    ProgressSink, Result, SchemaSpec,
};
use parking_lot::Mutex;

fn known_class(name: &str) -> Option<&'static str> {
    classes::builtin(name).map(|class| class.name)
}

/// A document held by a [`MemoryEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDocument {
    /// Document class
    pub class: String,
    /// Source path for file documents
    pub source: Option<PathBuf>,
    /// Metadata for string documents
    pub metadata: Vec<MetadataPair>,
}

#[derive(Debug)]
struct MemoryState {
    manifest: bool,
    recoverable: bool,
    open: bool,
    options: IndexOptions,
    schemas: BTreeMap<String, SchemaSpec>,
    applied_specs: usize,
    document_root: Option<PathBuf>,
    anchor_text: Option<PathBuf>,
    offset_annotations: Option<PathBuf>,
    offset_metadata: Option<PathBuf>,
    documents: BTreeMap<DocumentId, MemoryDocument>,
    live: BTreeSet<DocumentId>,
    next_id: u64,
    calls: Vec<&'static str>,
}

impl Default for MemoryState {
    fn default() -> Self {
        MemoryState {
            manifest: false,
            recoverable: true,
            open: false,
            options: IndexOptions::default(),
            schemas: BTreeMap::new(),
            applied_specs: 0,
            document_root: None,
            anchor_text: None,
            offset_annotations: None,
            offset_metadata: None,
            documents: BTreeMap::new(),
            live: BTreeSet::new(),
            next_id: 1,
            calls: Vec::new(),
        }
    }
}

impl MemoryState {
    fn require_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::InvalidOperation("repository is not open".to_string()))
        }
    }

    fn require_document_root(&self) -> Result<()> {
        self.require_open()?;
        if self.document_root.is_some() {
            Ok(())
        } else {
            Err(Error::InvalidOperation(
                "document root must be set before adding documents".to_string(),
            ))
        }
    }

    fn insert(&mut self, document: MemoryDocument) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.insert(id, document);
        self.live.insert(id);
        id
    }
}

/// In-memory engine with shared, inspectable state
#[derive(Clone, Default)]
pub struct MemoryEngine {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEngine {
    /// Engine with no repository on "disk"
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose repository already has a manifest
    pub fn with_manifest() -> Self {
        let engine = Self::new();
        engine.state.lock().manifest = true;
        engine
    }

    /// Make `recover_repository` report a negative outcome
    pub fn set_recoverable(&self, recoverable: bool) {
        self.state.lock().recoverable = recoverable;
    }

    /// Names of the engine operations called so far, in order
    ///
    /// Counter queries are not recorded.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    /// Number of `apply_schema_spec` calls that stored a spec
    pub fn applied_specs(&self) -> usize {
        self.state.lock().applied_specs
    }

    /// Stored spec for `class`, if one was applied
    pub fn stored_spec(&self, class: &str) -> Option<SchemaSpec> {
        self.state.lock().schemas.get(&canonical_name(class)).cloned()
    }

    /// Options from the last `configure`
    pub fn options(&self) -> IndexOptions {
        self.state.lock().options.clone()
    }

    /// Whether a repository is open
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Registered document root
    pub fn document_root(&self) -> Option<PathBuf> {
        self.state.lock().document_root.clone()
    }

    /// Registered anchor text, offset annotations and offset metadata paths
    pub fn auxiliary_paths(&self) -> (Option<PathBuf>, Option<PathBuf>, Option<PathBuf>) {
        let state = self.state.lock();
        (
            state.anchor_text.clone(),
            state.offset_annotations.clone(),
            state.offset_metadata.clone(),
        )
    }

    /// A document by id, including deleted ones
    pub fn document(&self, id: DocumentId) -> Option<MemoryDocument> {
        self.state.lock().documents.get(&id).cloned()
    }

    fn record(&self, call: &'static str) -> parking_lot::MutexGuard<'_, MemoryState> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state
    }
}

impl fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryEngine")
            .field("manifest", &state.manifest)
            .field("open", &state.open)
            .field("documents", &state.documents.len())
            .field("live", &state.live.len())
            .finish()
    }
}

impl IndexEngine for MemoryEngine {
    fn configure(&mut self, options: &IndexOptions) -> Result<()> {
        let mut state = self.record("configure");
        if state.open {
            return Err(Error::InvalidOperation(
                "cannot configure an open repository".to_string(),
            ));
        }
        state.options = options.clone();
        Ok(())
    }

    fn manifest_exists(&self, _path: &Path) -> bool {
        self.record("manifest_exists").manifest
    }

    fn recover_repository(&mut self, _path: &Path) -> Result<bool> {
        let state = self.record("recover_repository");
        Ok(state.manifest && state.recoverable)
    }

    fn create(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()> {
        {
            let mut state = self.record("create");
            let calls = std::mem::take(&mut state.calls);
            let options = state.options.clone();
            *state = MemoryState {
                manifest: true,
                open: true,
                options,
                calls,
                ..Default::default()
            };
        }
        progress.report(ProgressEvent::Created(path.to_path_buf()));
        Ok(())
    }

    fn open(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()> {
        {
            let mut state = self.record("open");
            if !state.manifest {
                return Err(Error::io(
                    path.join("manifest"),
                    io::Error::new(io::ErrorKind::NotFound, "manifest not found"),
                ));
            }
            state.open = true;
        }
        progress.report(ProgressEvent::Opened(path.to_path_buf()));
        Ok(())
    }

    fn schema_spec(&self, class: &str) -> Result<Option<SchemaSpec>> {
        let state = self.record("schema_spec");
        let name = canonical_name(class);
        if let Some(spec) = state.schemas.get(&name) {
            return Ok(Some(spec.clone()));
        }
        Ok(known_class(&name).map(SchemaSpec::new))
    }

    fn apply_schema_spec(&mut self, spec: &SchemaSpec) -> Result<()> {
        let mut state = self.record("apply_schema_spec");
        state.require_open()?;
        let class = canonical_name(&spec.class);
        let mut spec = spec.clone();
        spec.class = class.clone();
        state.schemas.insert(class, spec);
        state.applied_specs += 1;
        Ok(())
    }

    fn set_document_root(&mut self, path: &Path) -> Result<()> {
        let mut state = self.record("set_document_root");
        state.require_open()?;
        state.document_root = Some(path.to_path_buf());
        Ok(())
    }

    fn set_anchor_text_path(&mut self, path: &Path) -> Result<()> {
        let mut state = self.record("set_anchor_text_path");
        state.require_open()?;
        state.anchor_text = Some(path.to_path_buf());
        Ok(())
    }

    fn set_offset_annotations_path(&mut self, path: &Path) -> Result<()> {
        let mut state = self.record("set_offset_annotations_path");
        state.require_open()?;
        state.offset_annotations = Some(path.to_path_buf());
        Ok(())
    }

    fn set_offset_metadata_path(&mut self, path: &Path) -> Result<()> {
        let mut state = self.record("set_offset_metadata_path");
        state.require_open()?;
        state.offset_metadata = Some(path.to_path_buf());
        Ok(())
    }

    fn add_file(&mut self, path: &Path, class: Option<&str>) -> Result<DocumentId> {
        let mut state = self.record("add_file");
        state.require_document_root()?;
        let class = match class {
            Some(name) => known_class(name).ok_or_else(|| Error::Schema {
                class: name.to_string(),
                reason: "unknown document class".to_string(),
            })?,
            None => infer_class(path).ok_or_else(|| Error::UnknownDocumentClass {
                path: path.to_path_buf(),
            })?,
        };
        fs::metadata(path).map_err(|e| Error::io(path, e))?;
        Ok(state.insert(MemoryDocument {
            class: class.to_string(),
            source: Some(path.to_path_buf()),
            metadata: Vec::new(),
        }))
    }

    fn add_string(
        &mut self,
        _content: &str,
        class: &str,
        metadata: &[MetadataPair],
    ) -> Result<DocumentId> {
        let mut state = self.record("add_string");
        state.require_document_root()?;
        let class = known_class(class).ok_or_else(|| Error::Schema {
            class: class.to_string(),
            reason: "unknown document class".to_string(),
        })?;
        Ok(state.insert(MemoryDocument {
            class: class.to_string(),
            source: None,
            metadata: metadata.to_vec(),
        }))
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<()> {
        let mut state = self.record("delete_document");
        state.require_open()?;
        if state.live.remove(&id) {
            Ok(())
        } else {
            Err(Error::DocumentNotFound(id))
        }
    }

    fn documents_seen(&self) -> u64 {
        self.state.lock().documents.len() as u64
    }

    fn documents_indexed(&self) -> u64 {
        self.state.lock().live.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        self.record("close").open = false;
        Ok(())
    }
}

/// Engine operation a [`FailingEngine`] can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// `configure`
    Configure,
    /// `recover_repository`
    Recover,
    /// `create`
    Create,
    /// `open`
    Open,
    /// `schema_spec`
    SchemaSpec,
    /// `apply_schema_spec`
    ApplySchema,
    /// `set_document_root`
    DocumentRoot,
    /// `add_file`
    AddFile,
    /// `add_string`
    AddString,
    /// `delete_document`
    Delete,
    /// `close`
    Close,
}

impl FailPoint {
    /// Get fail point name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailPoint::Configure => "configure",
            FailPoint::Recover => "recover",
            FailPoint::Create => "create",
            FailPoint::Open => "open",
            FailPoint::SchemaSpec => "schema_spec",
            FailPoint::ApplySchema => "apply_schema_spec",
            FailPoint::DocumentRoot => "set_document_root",
            FailPoint::AddFile => "add_file",
            FailPoint::AddString => "add_string",
            FailPoint::Delete => "delete_document",
            FailPoint::Close => "close",
        }
    }
}

/// Engine that fails one operation with an injected I/O error
#[derive(Debug)]
pub struct FailingEngine<E: IndexEngine = MemoryEngine> {
    inner: E,
    point: FailPoint,
    remaining: u64,
}

impl<E: IndexEngine> FailingEngine<E> {
    /// Fail the first call to `point`
    pub fn new(inner: E, point: FailPoint) -> Self {
        FailingEngine {
            inner,
            point,
            remaining: 0,
        }
    }

    /// Let `successes` calls to the fail point through before failing
    ///
    /// Only counted for operations taking `&mut self`; `schema_spec` fails
    /// once the budget is spent.
    pub fn after(mut self, successes: u64) -> Self {
        self.remaining = successes;
        self
    }

    /// Borrow the wrapped engine
    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn trip(&mut self, point: FailPoint, path: &Path) -> Result<()> {
        if point != self.point {
            return Ok(());
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(());
        }
        Err(injected(point, path))
    }
}

fn injected(point: FailPoint, path: &Path) -> Error {
    Error::io(
        path,
        io::Error::new(
            io::ErrorKind::Other,
            format!("injected {} failure", point.as_str()),
        ),
    )
}

impl<E: IndexEngine> IndexEngine for FailingEngine<E> {
    fn configure(&mut self, options: &IndexOptions) -> Result<()> {
        self.trip(FailPoint::Configure, Path::new(""))?;
        self.inner.configure(options)
    }

    fn manifest_exists(&self, path: &Path) -> bool {
        self.inner.manifest_exists(path)
    }

    fn recover_repository(&mut self, path: &Path) -> Result<bool> {
        self.trip(FailPoint::Recover, path)?;
        self.inner.recover_repository(path)
    }

    fn create(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()> {
        self.trip(FailPoint::Create, path)?;
        self.inner.create(path, progress)
    }

    fn open(&mut self, path: &Path, progress: &mut dyn ProgressSink) -> Result<()> {
        self.trip(FailPoint::Open, path)?;
        self.inner.open(path, progress)
    }

    fn schema_spec(&self, class: &str) -> Result<Option<SchemaSpec>> {
        if self.point == FailPoint::SchemaSpec && self.remaining == 0 {
            return Err(injected(FailPoint::SchemaSpec, Path::new(class)));
        }
        self.inner.schema_spec(class)
    }

    fn apply_schema_spec(&mut self, spec: &SchemaSpec) -> Result<()> {
        self.trip(FailPoint::ApplySchema, Path::new(&spec.class))?;
        self.inner.apply_schema_spec(spec)
    }

    fn set_document_root(&mut self, path: &Path) -> Result<()> {
        self.trip(FailPoint::DocumentRoot, path)?;
        self.inner.set_document_root(path)
    }

    fn set_anchor_text_path(&mut self, path: &Path) -> Result<()> {
        self.inner.set_anchor_text_path(path)
    }

    fn set_offset_annotations_path(&mut self, path: &Path) -> Result<()> {
        self.inner.set_offset_annotations_path(path)
    }

    fn set_offset_metadata_path(&mut self, path: &Path) -> Result<()> {
        self.inner.set_offset_metadata_path(path)
    }

    fn add_file(&mut self, path: &Path, class: Option<&str>) -> Result<DocumentId> {
        self.trip(FailPoint::AddFile, path)?;
        self.inner.add_file(path, class)
    }

    fn add_string(
        &mut self,
        content: &str,
        class: &str,
        metadata: &[MetadataPair],
    ) -> Result<DocumentId> {
        self.trip(FailPoint::AddString, Path::new(class))?;
        self.inner.add_string(content, class, metadata)
    }

    fn delete_document(&mut self, id: DocumentId) -> Result<()> {
        self.trip(FailPoint::Delete, Path::new(""))?;
        self.inner.delete_document(id)
    }

    fn documents_seen(&self) -> u64 {
        self.inner.documents_seen()
    }

    fn documents_indexed(&self) -> u64 {
        self.inner.documents_indexed()
    }

    fn close(&mut self) -> Result<()> {
        self.trip(FailPoint::Close, Path::new(""))?;
        self.inner.close()
    }
}
