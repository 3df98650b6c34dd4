//! Document-class schema types
//!
//! A [`SchemaSpec`] describes how one document class is indexed: the fields
//! extracted (with a numeric flag), tags kept for inclusion, and the forward
//! and backward metadata lists. Names are compared case-insensitively and
//! stored in [`canonical_name`] form.

use serde::{Deserialize, Serialize};

/// Canonical (lower-case, trimmed) form of a field or metadata name
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// An indexed field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Whether values are indexed as numbers
    #[serde(default)]
    pub numeric: bool,
}

impl FieldSpec {
    /// A text field
    pub fn text(name: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            numeric: false,
        }
    }

    /// A numeric field
    pub fn numeric(name: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            numeric: true,
        }
    }
}

/// Stored schema of one document class
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Document class name
    pub class: String,
    /// Indexed fields
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Tags whose content is indexed (empty = whole document)
    #[serde(default)]
    pub include: Vec<String>,
    /// Tags stored as metadata
    #[serde(default)]
    pub metadata: Vec<String>,
    /// Forward metadata (document to value lookup)
    #[serde(default)]
    pub forward: Vec<String>,
    /// Backward metadata (value to document lookup)
    #[serde(default)]
    pub backward: Vec<String>,
}

impl SchemaSpec {
    /// Empty spec for `class`
    pub fn new(class: impl Into<String>) -> Self {
        SchemaSpec {
            class: class.into(),
            ..Default::default()
        }
    }

    /// Case-insensitive field lookup
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        let wanted = canonical_name(name);
        self.fields
            .iter()
            .find(|f| canonical_name(&f.name) == wanted)
    }

    /// Case-insensitive forward metadata membership
    pub fn has_forward(&self, name: &str) -> bool {
        contains_name(&self.forward, name)
    }

    /// Case-insensitive backward metadata membership
    pub fn has_backward(&self, name: &str) -> bool {
        contains_name(&self.backward, name)
    }
}

/// Case-insensitive membership test over a name list
pub fn contains_name(names: &[String], name: &str) -> bool {
    let wanted = canonical_name(name);
    names.iter().any(|n| canonical_name(n) == wanted)
}

/// Fields and metadata a build session asks for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaRequest {
    /// Requested indexed fields
    pub fields: Vec<FieldSpec>,
    /// Requested metadata tags
    #[serde(default)]
    pub metadata: Vec<String>,
    /// Requested forward metadata
    pub forward: Vec<String>,
    /// Requested backward metadata
    pub backward: Vec<String>,
}

impl SchemaRequest {
    /// True when nothing is requested
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.metadata.is_empty()
            && self.forward.is_empty()
            && self.backward.is_empty()
    }
}
