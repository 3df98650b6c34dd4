//! Build orchestration for Docket
//!
//! This crate drives a repository session over any `IndexEngine`:
//! - Config: required-parameter validation and defaults
//! - Lifecycle: create / recover / open state machine
//! - Reconcile: idempotent class schema updates
//! - Ingest: add, delete and corpus walks with counter invariants
//! - Builder: the full session in one call
//!
//! The in-memory and failure-injecting engines in `testing` are compiled
//! only for this crate's tests or with the `testing` feature.
//!
//! The engine is the only component that touches storage; everything here
//! is sequencing and validation around it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod error;
pub mod ingest;
pub mod lifecycle;
pub mod progress;
pub mod reconcile;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::{BuildReport, IndexBuilder};
pub use config::{BuildConfig, REQUIRED_PARAMETERS};
pub use error::{BuildError, IngestError, LifecycleError};
pub use ingest::{IngestionPipeline, WalkReport};
pub use lifecycle::{CorpusPaths, LifecycleMode, LifecycleState, RepositoryLifecycle};
pub use progress::{NullProgress, RecordingProgress, TracingProgress};
pub use reconcile::augment_spec;
