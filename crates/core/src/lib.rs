//! Core types and traits for Docket
//!
//! This crate defines the foundations shared by the storage and engine layers:
//! - Params: hierarchical parameter tree, paths, loader and typed store
//! - Metadata: fixed-capacity metadata slots for in-memory documents
//! - Schema: field and metadata specs per document class
//! - Classes: built-in document classes and extension inference
//! - Types: DocumentId, IndexOptions
//! - Error: engine boundary error type
//! - Traits: IndexEngine and ProgressSink collaborator boundaries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classes;
pub mod error;
pub mod metadata;
pub mod params;
pub mod schema;
pub mod traits;
pub mod types;

pub use classes::{DocumentClass, BUILTIN_CLASSES};
pub use error::{Error, Result};
pub use metadata::{MetadataError, MetadataPair, MetadataPairSet};
pub use params::{
    parse_parameters, read_params_file, ParamPath, ParamPathError, ParameterNode, ParameterStore,
    ParameterTree, ParseError, SourceError, MAX_PARAMS_SIZE,
};
pub use schema::{canonical_name, FieldSpec, SchemaRequest, SchemaSpec};
pub use traits::{IndexEngine, ProgressEvent, ProgressSink};
pub use types::{DocumentId, IndexOptions, DEFAULT_MEMORY, DEFAULT_STEMMER};
