//! Shared value types for the engine boundary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::FieldSpec;

/// Default memory budget in bytes (1 GiB)
pub const DEFAULT_MEMORY: u64 = 1_073_741_824;

/// Default stemmer name
pub const DEFAULT_STEMMER: &str = "Krovetz";

/// Identifier assigned by an engine to an ingested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl DocumentId {
    /// Raw numeric value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        DocumentId(id)
    }
}

/// Repository-wide options applied before the lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Memory budget in bytes
    pub memory: u64,
    /// Case-fold and strip punctuation from terms
    pub normalize: bool,
    /// Stemmer name, `None` to disable
    pub stemmer: Option<String>,
    /// Stop words
    #[serde(default)]
    pub stopwords: Vec<String>,
    /// Keep a copy of each document's content
    pub store_docs: bool,
    /// Add the source URL to indexed text
    pub inject_url: bool,
    /// Indexed fields with numeric flags
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Forward metadata names
    #[serde(default)]
    pub forward: Vec<String>,
    /// Backward metadata names
    #[serde(default)]
    pub backward: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            memory: DEFAULT_MEMORY,
            normalize: true,
            stemmer: Some(DEFAULT_STEMMER.to_string()),
            stopwords: Vec::new(),
            store_docs: true,
            inject_url: true,
            fields: Vec::new(),
            forward: Vec::new(),
            backward: Vec::new(),
        }
    }
}
