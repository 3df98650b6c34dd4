//! Hierarchical parameter store
//!
//! Configuration is an XML document rooted at `<parameters>`. It is parsed
//! into a [`ParameterTree`] of [`ParameterNode`]s and queried through a
//! [`ParameterStore`] with dot-separated [`ParamPath`]s.

mod loader;
mod node;
pub mod number;
mod path;
mod source;
mod store;

pub use loader::{parse_parameters, ParseError, MAX_PARAMS_SIZE};
pub use node::{ParameterNode, ParameterTree, REPEATED_GROUPS, ROOT_NAME};
pub use path::{ParamPath, ParamPathError, PathSegment, MAX_PATH_SEGMENTS};
pub use source::{read_params_file, SourceError};
pub use store::ParameterStore;
