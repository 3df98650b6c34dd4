//! Repository lifecycle state machine
//!
//! A [`RepositoryLifecycle`] owns one engine and makes exactly one transition
//! per session, driven by on-disk evidence:
//!
//! | Manifest | Recovery      | Engine call | Result      |
//! |----------|---------------|-------------|-------------|
//! | absent   | not attempted | `create`    | `Created`   |
//! | present  | `Ok(true)`    | `open`      | `Recovered` |
//! | present  | `Ok(false)`   | `create`    | `Created`   |
//! | any      | `Err(_)`      | none        | `Failed`    |
//!
//! An unrecoverable repository is a negative outcome, not an error: it is
//! recreated. Engine errors abort the session in `Failed` and are returned
//! unchanged, with no retry.
//!
//! After the transition the caller reconciles the class schema, registers
//! the corpus paths, and converts the lifecycle into an
//! [`IngestionPipeline`].

use std::fmt;
use std::path::{Path, PathBuf};

use docket_core::{Error, IndexEngine, ProgressEvent, ProgressSink, SchemaRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LifecycleError;
use crate::ingest::IngestionPipeline;
use crate::reconcile::augment_spec;

/// Where a repository session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No transition attempted yet
    Unknown,
    /// A fresh repository was created
    Created,
    /// An existing repository passed recovery and was opened
    Recovered,
    /// An existing repository was opened without recovery
    Opened,
    /// The transition failed; the session is over
    Failed,
}

impl LifecycleState {
    /// Check if the repository is open for reconciliation and ingestion
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            LifecycleState::Created | LifecycleState::Recovered | LifecycleState::Opened
        )
    }

    /// Check if the one transition has already happened
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LifecycleState::Unknown)
    }

    /// Get state name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Unknown => "unknown",
            LifecycleState::Created => "created",
            LifecycleState::Recovered => "recovered",
            LifecycleState::Opened => "opened",
            LifecycleState::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the transition treats an existing repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleMode {
    /// Create when absent, otherwise recover then open (or recreate)
    #[default]
    BuildOrRecover,
    /// Open an existing repository as is; never create
    OpenExisting,
}

/// Corpus locations registered on an open repository
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusPaths {
    /// Directory documents are added from
    pub document_root: PathBuf,
    /// Anchor text (inlinks)
    pub anchor_text: Option<PathBuf>,
    /// Offset annotations
    pub offset_annotations: Option<PathBuf>,
    /// Offset metadata
    pub offset_metadata: Option<PathBuf>,
}

impl CorpusPaths {
    /// Paths with only a document root
    pub fn new(document_root: impl Into<PathBuf>) -> Self {
        CorpusPaths {
            document_root: document_root.into(),
            ..Default::default()
        }
    }
}

/// One repository session's state machine
pub struct RepositoryLifecycle<E: IndexEngine> {
    engine: E,
    path: PathBuf,
    mode: LifecycleMode,
    state: LifecycleState,
    document_root: Option<PathBuf>,
}

impl<E: IndexEngine> RepositoryLifecycle<E> {
    /// Lifecycle for the repository at `path`
    pub fn new(engine: E, path: impl Into<PathBuf>) -> Self {
        RepositoryLifecycle {
            engine,
            path: path.into(),
            mode: LifecycleMode::default(),
            state: LifecycleState::Unknown,
            document_root: None,
        }
    }

    /// Set the transition mode
    pub fn with_mode(mut self, mode: LifecycleMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Transition mode
    pub fn mode(&self) -> LifecycleMode {
        self.mode
    }

    /// Borrow the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutably borrow the engine
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Give the engine back
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Create, recover or open the repository
    ///
    /// Allowed once per lifecycle. On error the state becomes `Failed` and
    /// the engine error is returned as is.
    pub fn transition(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<LifecycleState, LifecycleError> {
        if self.state.is_terminal() {
            return Err(LifecycleError::AlreadyTransitioned { state: self.state });
        }

        let outcome = match self.mode {
            LifecycleMode::BuildOrRecover => self.build_or_recover(progress),
            LifecycleMode::OpenExisting => self.open_existing(progress),
        };

        match outcome {
            Ok(state) => {
                self.state = state;
                info!(
                    target: "docket::lifecycle",
                    path = %self.path.display(),
                    state = %state,
                    "Repository ready"
                );
                Ok(state)
            }
            Err(e) => {
                self.state = LifecycleState::Failed;
                warn!(
                    target: "docket::lifecycle",
                    path = %self.path.display(),
                    error = %e,
                    "Repository transition failed"
                );
                Err(e)
            }
        }
    }

    fn build_or_recover(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<LifecycleState, LifecycleError> {
        if !self.engine.manifest_exists(&self.path) {
            debug!(target: "docket::lifecycle", path = %self.path.display(), "No manifest");
            self.create(progress)?;
            return Ok(LifecycleState::Created);
        }

        let recovered = self
            .engine
            .recover_repository(&self.path)
            .map_err(|e| self.repository_error("recover", e))?;

        if recovered {
            self.engine
                .open(&self.path, progress)
                .map_err(|e| self.repository_error("open", e))?;
            progress.report(ProgressEvent::Recovered(self.path.clone()));
            Ok(LifecycleState::Recovered)
        } else {
            warn!(
                target: "docket::lifecycle",
                path = %self.path.display(),
                "Repository could not be recovered, recreating"
            );
            self.create(progress)?;
            Ok(LifecycleState::Created)
        }
    }

    fn open_existing(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<LifecycleState, LifecycleError> {
        if !self.engine.manifest_exists(&self.path) {
            return Err(LifecycleError::MissingManifest {
                path: self.path.clone(),
            });
        }
        self.engine
            .open(&self.path, progress)
            .map_err(|e| self.repository_error("open", e))?;
        Ok(LifecycleState::Opened)
    }

    fn create(&mut self, progress: &mut dyn ProgressSink) -> Result<(), LifecycleError> {
        self.engine
            .create(&self.path, progress)
            .map_err(|e| self.repository_error("create", e))
    }

    fn repository_error(&self, operation: &'static str, source: Error) -> LifecycleError {
        LifecycleError::Repository {
            path: self.path.clone(),
            operation,
            source,
        }
    }

    fn require_open(&self) -> Result<(), LifecycleError> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(LifecycleError::NotOpen { state: self.state })
        }
    }

    /// Fold `request` into the stored schema of `class`
    ///
    /// Returns whether the stored schema changed. The engine is only asked
    /// to apply a spec that differs from what it returned. A class the
    /// engine has no schema for is left alone and reported as unchanged.
    pub fn reconcile_schema(
        &mut self,
        class: &str,
        request: &SchemaRequest,
    ) -> Result<bool, LifecycleError> {
        self.require_open()?;

        let schema_error = |source| LifecycleError::Schema {
            class: class.to_string(),
            source,
        };
        let Some(mut spec) = self.engine.schema_spec(class).map_err(schema_error)? else {
            warn!(
                target: "docket::lifecycle",
                class,
                "No schema for document class, skipping reconciliation"
            );
            return Ok(false);
        };

        let changed = augment_spec(&mut spec, request);
        if changed {
            self.engine.apply_schema_spec(&spec).map_err(schema_error)?;
        }
        info!(
            target: "docket::lifecycle",
            class = %spec.class,
            changed,
            fields = spec.fields.len(),
            forward = spec.forward.len(),
            backward = spec.backward.len(),
            "Reconciled schema"
        );
        Ok(changed)
    }

    /// Register the document root and any auxiliary corpus paths
    pub fn register_paths(&mut self, paths: &CorpusPaths) -> Result<(), LifecycleError> {
        self.require_open()?;

        let registration_error = |kind, path: &Path, source| LifecycleError::PathRegistration {
            kind,
            path: path.to_path_buf(),
            source,
        };

        self.engine
            .set_document_root(&paths.document_root)
            .map_err(|e| registration_error("document root", paths.document_root.as_path(), e))?;
        if let Some(path) = &paths.anchor_text {
            self.engine
                .set_anchor_text_path(path)
                .map_err(|e| registration_error("anchor text", path.as_path(), e))?;
        }
        if let Some(path) = &paths.offset_annotations {
            self.engine
                .set_offset_annotations_path(path)
                .map_err(|e| registration_error("offset annotations", path.as_path(), e))?;
        }
        if let Some(path) = &paths.offset_metadata {
            self.engine
                .set_offset_metadata_path(path)
                .map_err(|e| registration_error("offset metadata", path.as_path(), e))?;
        }

        self.document_root = Some(paths.document_root.clone());
        debug!(
            target: "docket::lifecycle",
            root = %paths.document_root.display(),
            "Registered corpus paths"
        );
        Ok(())
    }

    /// Hand the open, path-registered repository to an ingestion pipeline
    pub fn into_pipeline(self) -> Result<IngestionPipeline<E>, LifecycleError> {
        self.require_open()?;
        let root = self.document_root.ok_or(LifecycleError::DocumentRootNotSet)?;
        Ok(IngestionPipeline::new(self.engine, root))
    }
}

impl<E: IndexEngine> fmt::Debug for RepositoryLifecycle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryLifecycle")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("document_root", &self.document_root)
            .finish()
    }
}
