//! Storage layer for Docket
//!
//! This crate implements a file-backed repository behind the
//! `IndexEngine` boundary:
//! - Manifest marker with CRC32 (written last on create)
//! - Per-class schema store and session options (JSON)
//! - Document journal replayed on open and during crash recovery
//! - Exclusive directory lock while a repository is open

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod paths;
pub mod repository;

pub use docket_core::classes::{infer_class, DocumentClass, BUILTIN_CLASSES};
pub use format::{Manifest, ManifestError, ManifestManager};
pub use paths::RepositoryPaths;
pub use repository::{DocumentTable, FileRepository};
