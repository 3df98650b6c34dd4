//! Build session driver
//!
//! [`IndexBuilder`] runs one complete session against an engine:
//!
//! 1. resolve [`BuildConfig`] from the parameters
//! 2. configure the engine
//! 3. lifecycle transition (create, recover or open)
//! 4. reconcile the corpus class schema, when a class is configured
//! 5. register the document root and auxiliary paths
//! 6. walk and ingest the corpus
//! 7. close, reporting `Closing` and `Finished`
//!
//! A failure after step 3 still closes the repository and reports
//! `Closing`; the first error is the one returned.
//!
//! # Example
//!
//! ```ignore
//! use docket_engine::{IndexBuilder, TracingProgress};
//! use docket_storage::FileRepository;
//!
//! let params = ParameterStore::from_text(&text)?;
//! let report = IndexBuilder::new(FileRepository::new())
//!     .build(&params, &mut TracingProgress)?;
//! println!("{} seen, {} indexed", report.seen, report.indexed);
//! ```

use docket_core::{IndexEngine, ParameterStore, ProgressEvent, ProgressSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::ingest::IngestionPipeline;
use crate::lifecycle::{LifecycleMode, LifecycleState, RepositoryLifecycle};

/// Summary of a build session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// State reached by the lifecycle transition
    pub state: LifecycleState,
    /// Whether schema reconciliation changed the stored schema
    pub schema_changed: bool,
    /// Documents ever added to the repository
    pub seen: u64,
    /// Documents added and not deleted
    pub indexed: u64,
    /// Files added by this session's corpus walk
    pub added: u64,
    /// Walk entries that vanished before they could be added
    pub skipped: u64,
}

/// Drives one build session
#[derive(Debug)]
pub struct IndexBuilder<E: IndexEngine> {
    engine: E,
    mode: LifecycleMode,
}

impl<E: IndexEngine> IndexBuilder<E> {
    /// Builder over `engine`
    pub fn new(engine: E) -> Self {
        IndexBuilder {
            engine,
            mode: LifecycleMode::default(),
        }
    }

    /// Set the lifecycle mode
    pub fn mode(mut self, mode: LifecycleMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the whole session and close the repository
    pub fn build(
        self,
        params: &ParameterStore,
        progress: &mut dyn ProgressSink,
    ) -> Result<BuildReport, BuildError> {
        let (report, mut pipeline) = self.build_open(params, progress)?;
        pipeline.close(progress)?;
        Ok(report)
    }

    /// Run the session up to and including the corpus walk
    ///
    /// The repository stays open; the returned pipeline accepts further
    /// documents and must be closed by the caller.
    pub fn build_open(
        self,
        params: &ParameterStore,
        progress: &mut dyn ProgressSink,
    ) -> Result<(BuildReport, IngestionPipeline<E>), BuildError> {
        let config = BuildConfig::from_params(params)?;
        debug!(target: "docket::params", params = %params.to_xml(), "Effective parameters");

        let mut engine = self.engine;
        engine
            .configure(&config.to_index_options())
            .map_err(BuildError::Configure)?;

        let mut lifecycle =
            RepositoryLifecycle::new(engine, config.index.clone()).with_mode(self.mode);
        let state = lifecycle.transition(progress)?;

        let schema_changed = match &config.class {
            Some(class) => match lifecycle.reconcile_schema(class, &config.schema_request()) {
                Ok(changed) => changed,
                Err(e) => return Err(close_after_failure(lifecycle.engine_mut(), progress, e)),
            },
            None => false,
        };

        if let Err(e) = lifecycle.register_paths(&config.corpus) {
            return Err(close_after_failure(lifecycle.engine_mut(), progress, e));
        }
        // Open with a registered root, so this cannot fail
        let mut pipeline = lifecycle.into_pipeline()?;

        progress.report(ProgressEvent::Status(format!(
            "indexing {}",
            config.corpus.document_root.display()
        )));
        let walk = match pipeline
            .ingest_directory(&config.corpus.document_root, config.class.as_deref())
        {
            Ok(walk) => walk,
            Err(e) => return Err(close_after_failure(pipeline.engine_mut(), progress, e)),
        };

        let report = BuildReport {
            state,
            schema_changed,
            seen: pipeline.documents_seen(),
            indexed: pipeline.documents_indexed(),
            added: walk.added.len() as u64,
            skipped: walk.skipped,
        };
        info!(
            target: "docket::ingest",
            index = %config.index.display(),
            state = %report.state,
            seen = report.seen,
            indexed = report.indexed,
            "Build complete"
        );
        Ok((report, pipeline))
    }
}

/// Close an engine left open by a failed session, keeping the original error
fn close_after_failure<E: IndexEngine>(
    engine: &mut E,
    progress: &mut dyn ProgressSink,
    error: impl Into<BuildError>,
) -> BuildError {
    let error = error.into();
    progress.report(ProgressEvent::Closing);
    if let Err(close_error) = engine.close() {
        warn!(
            target: "docket::lifecycle",
            error = %close_error,
            "Close after failed build also failed"
        );
    }
    error
}
