//! Built-in document classes
//!
//! Each class names a parsing convention and the file extensions it is
//! inferred from. Class names are matched case-insensitively.

use std::path::Path;

use crate::schema::SchemaSpec;

/// A built-in document class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentClass {
    /// Class name
    pub name: &'static str,
    /// Extensions (lower-case, no dot) inferring this class
    pub extensions: &'static [&'static str],
    /// Tags whose content is indexed; empty indexes the whole document
    pub include: &'static [&'static str],
    /// Tags kept as metadata
    pub metadata: &'static [&'static str],
}

impl DocumentClass {
    /// Default schema for this class
    pub fn default_spec(&self) -> SchemaSpec {
        SchemaSpec {
            class: self.name.to_string(),
            include: self.include.iter().map(|s| s.to_string()).collect(),
            metadata: self.metadata.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// Classes every repository understands
pub const BUILTIN_CLASSES: &[DocumentClass] = &[
    DocumentClass {
        name: "html",
        extensions: &["html", "htm"],
        include: &[],
        metadata: &["title"],
    },
    DocumentClass {
        name: "xml",
        extensions: &["xml"],
        include: &[],
        metadata: &[],
    },
    DocumentClass {
        name: "trectext",
        extensions: &["trectext"],
        include: &[
            "text", "hl", "head", "headline", "title", "ttl", "dd", "date", "lp", "leadpara",
        ],
        metadata: &["docno"],
    },
    DocumentClass {
        name: "trecweb",
        extensions: &["trecweb"],
        include: &[],
        metadata: &["docno", "url"],
    },
    DocumentClass {
        name: "text",
        extensions: &["txt", "text"],
        include: &[],
        metadata: &[],
    },
];

/// Look up a built-in class by name
pub fn builtin(name: &str) -> Option<&'static DocumentClass> {
    BUILTIN_CLASSES
        .iter()
        .find(|class| class.name.eq_ignore_ascii_case(name.trim()))
}

/// Infer a class from a file extension
pub fn infer_class(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    BUILTIN_CLASSES
        .iter()
        .find(|class| class.extensions.contains(&ext.as_str()))
        .map(|class| class.name)
}
