//! Typed parameter store
//!
//! `ParameterStore` owns one [`ParameterTree`] and exposes path-addressed
//! typed getters with default fallback, setters that create missing paths,
//! and atomic replace-or-reject loading.
//!
//! # Example
//!
//! ```
//! use docket_core::params::ParameterStore;
//!
//! let mut params = ParameterStore::new();
//! params.load("<parameters><memory>100m</memory></parameters>").unwrap();
//! assert_eq!(params.get_int("memory", 0), 100_000_000);
//!
//! params.set_string("stemmer.name", "krovetz").unwrap();
//! assert_eq!(params.get_string("stemmer.name", "porter"), "krovetz");
//! assert_eq!(params.get_double("missing", 3.3), 3.3);
//! ```

use quick_xml::escape::escape;

use super::loader::{parse_parameters, ParseError};
use super::node::{ParameterNode, ParameterTree, ROOT_NAME};
use super::path::{ParamPath, ParamPathError};

/// Path-addressed, typed configuration store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    tree: ParameterTree,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        ParameterStore {
            tree: ParameterTree::new(),
        }
    }

    /// Build a store from configuration text
    pub fn from_text(text: &str) -> Result<Self, ParseError> {
        Ok(ParameterStore {
            tree: parse_parameters(text)?,
        })
    }

    /// Replace the tree with the parsed `text`
    ///
    /// On error the existing contents are left unchanged.
    pub fn load(&mut self, text: &str) -> Result<(), ParseError> {
        self.tree = parse_parameters(text)?;
        Ok(())
    }

    /// Overlay another store's tree onto this one
    pub fn merge(&mut self, other: ParameterStore) {
        self.tree.root_mut().merge(other.tree.into_root());
    }

    /// The underlying tree
    pub fn tree(&self) -> &ParameterTree {
        &self.tree
    }

    /// True iff `path` resolves to a node with a value or a child
    pub fn exists(&self, path: &str) -> bool {
        self.tree.root().exists(path)
    }

    /// First value at `path` as a string, or `default`
    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.tree.root().get_string(path, default)
    }

    /// First value at `path` as `i32`, or `default`
    pub fn get_int(&self, path: &str, default: i32) -> i32 {
        self.tree.root().get_int(path, default)
    }

    /// First value at `path` as `i64`, or `default`
    pub fn get_int64(&self, path: &str, default: i64) -> i64 {
        self.tree.root().get_int64(path, default)
    }

    /// First value at `path` as `u64`, or `default`
    pub fn get_uint64(&self, path: &str, default: u64) -> u64 {
        self.tree.root().get_uint64(path, default)
    }

    /// First value at `path` as `f64`, or `default`
    pub fn get_double(&self, path: &str, default: f64) -> f64 {
        self.tree.root().get_double(path, default)
    }

    /// First value at `path` as `bool`, or `default`
    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.tree.root().get_bool(path, default)
    }

    /// All values across repeated nodes matched by `path`
    pub fn get_all(&self, path: &str) -> Vec<String> {
        self.tree.root().get_all(path)
    }

    /// Repeated groups matched by `path`
    pub fn nodes(&self, path: &str) -> Vec<&ParameterNode> {
        self.tree.root().nodes(path)
    }

    /// Set the first value at `path`, creating the path if needed
    pub fn set_string(&mut self, path: &str, value: &str) -> Result<(), ParamPathError> {
        self.set_scalar(path, value.to_string())
    }

    /// Set an `i32` value
    pub fn set_int(&mut self, path: &str, value: i32) -> Result<(), ParamPathError> {
        self.set_scalar(path, value.to_string())
    }

    /// Set an `i64` value
    pub fn set_int64(&mut self, path: &str, value: i64) -> Result<(), ParamPathError> {
        self.set_scalar(path, value.to_string())
    }

    /// Set a `u64` value
    pub fn set_uint64(&mut self, path: &str, value: u64) -> Result<(), ParamPathError> {
        self.set_scalar(path, value.to_string())
    }

    /// Set an `f64` value
    pub fn set_double(&mut self, path: &str, value: f64) -> Result<(), ParamPathError> {
        self.set_scalar(path, value.to_string())
    }

    /// Set a `bool` value
    pub fn set_bool(&mut self, path: &str, value: bool) -> Result<(), ParamPathError> {
        self.set_scalar(path, value.to_string())
    }

    fn set_scalar(&mut self, path: &str, value: String) -> Result<(), ParamPathError> {
        let path: ParamPath = path.parse()?;
        if path.is_root() {
            return Err(ParamPathError::RootNotAssignable);
        }
        self.tree.root_mut().resolve_or_create(&path)?.set_value(value);
        Ok(())
    }

    /// Delete the node at `path` and its subtree
    ///
    /// A path that does not exist (or does not parse) is a no-op; the return
    /// value reports whether anything was removed.
    pub fn remove(&mut self, path: &str) -> bool {
        match path.parse::<ParamPath>() {
            Ok(path) => self.tree.root_mut().remove(&path),
            Err(_) => false,
        }
    }

    /// Reset to an empty tree
    pub fn clear(&mut self) {
        self.tree.root_mut().clear();
    }

    /// Number of scalar values stored anywhere in the tree
    pub fn size(&self) -> i64 {
        self.tree.root().value_count() as i64
    }

    /// Render the tree back into the `parameters` document format
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, self.tree.root(), 0);
        out
    }
}

fn write_node(out: &mut String, node: &ParameterNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = if depth == 0 { ROOT_NAME } else { node.name() };
    let has_children = node.child_groups().any(|(_, group)| !group.is_empty());

    if !has_children {
        match node.values() {
            [] => out.push_str(&format!("{indent}<{name}/>\n")),
            values => {
                for value in values {
                    out.push_str(&format!("{indent}<{name}>{}</{name}>\n", escape(value.as_str())));
                }
            }
        }
        return;
    }

    out.push_str(&format!("{indent}<{name}>\n"));
    for value in node.values() {
        out.push_str(&format!("{indent}  {}\n", escape(value.as_str())));
    }
    for (_, group) in node.child_groups() {
        for child in group {
            write_node(out, child, depth + 1);
        }
    }
    out.push_str(&format!("{indent}</{name}>\n"));
}
