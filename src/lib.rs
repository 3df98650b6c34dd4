//! Docket - parameter-driven document repository builder
//!
//! Docket turns a `parameters` configuration document into a ready
//! document repository: it resolves typed parameters with defaults,
//! decides whether to create, recover or open the repository, reconciles
//! the stored field schema, and streams the corpus into it.
//!
//! # Quick Start
//!
//! ```ignore
//! use docket::{FileRepository, IndexBuilder, ParameterStore, TracingProgress};
//!
//! let mut params = ParameterStore::new();
//! params.load_command_line(["build.xml", "-memory=2g"])?;
//! let report = IndexBuilder::new(FileRepository::new()).build(&params, &mut TracingProgress)?;
//! println!("{} documents indexed", report.indexed);
//! ```
//!
//! # Architecture
//!
//! - `docket-core`: parameter tree and store, metadata slots, schema types,
//!   and the `IndexEngine` boundary
//! - `docket-storage`: `FileRepository`, the file-backed engine
//! - `docket-engine`: lifecycle state machine, reconciliation, ingestion and
//!   the `IndexBuilder` session driver

pub use docket_core::{
    canonical_name, DocumentId, Error, FieldSpec, IndexEngine, IndexOptions, MetadataError,
    MetadataPair, MetadataPairSet, ParameterStore, ParseError, ProgressEvent, ProgressSink,
    SchemaRequest, SchemaSpec, SourceError,
};
pub use docket_engine::{
    BuildConfig, BuildError, BuildReport, CorpusPaths, IndexBuilder, IngestError,
    IngestionPipeline, LifecycleError, LifecycleMode, LifecycleState, NullProgress,
    RecordingProgress, RepositoryLifecycle, TracingProgress, WalkReport,
};
pub use docket_storage::FileRepository;

/// Parameter tree internals
pub mod params {
    pub use docket_core::params::*;
}
