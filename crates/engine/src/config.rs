//! Build configuration resolved from a parameter store
//!
//! This is the caller-level validation layer over [`ParameterStore`]: the
//! store itself never fails a lookup, so required keys are checked here and
//! everything else falls back to its default.
//!
//! | Key                      | Default      | Notes                           |
//! |--------------------------|--------------|---------------------------------|
//! | `index`                  | required     | repository path                 |
//! | `corpus.path`            | required     | document root (`corpus` too)    |
//! | `corpus.class`           | none         | inferred per file when absent   |
//! | `corpus.metadata`        | none         | offset metadata path            |
//! | `corpus.inlink`          | none         | anchor text path                |
//! | `corpus.annotations`     | none         | offset annotations path         |
//! | `memory`                 | 1 GiB        | `k`/`m`/`g` suffixes            |
//! | `normalize`              | true         |                                 |
//! | `injectURL`              | true         |                                 |
//! | `storeDocs`              | true         |                                 |
//! | `stemmer.name`           | `Krovetz`    |                                 |
//! | `stopper.word`           | empty        | repeated, lower-cased           |
//! | `field`                  | empty        | repeated `name` + `numeric`     |
//! | `metadata.field.name`    | empty        | repeated                        |
//! | `metadata.forward`       | empty        | repeated                        |
//! | `metadata.backward`      | empty        | repeated                        |

use std::path::PathBuf;

use docket_core::{
    canonical_name, FieldSpec, IndexOptions, ParameterStore, SchemaRequest, DEFAULT_MEMORY,
    DEFAULT_STEMMER,
};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::lifecycle::CorpusPaths;

/// Keys that must be present for a build
pub const REQUIRED_PARAMETERS: [&str; 3] = ["index", "corpus", "corpus.path"];

/// Everything a build session needs from its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Repository path
    pub index: PathBuf,
    /// Corpus locations
    pub corpus: CorpusPaths,
    /// Document class for every corpus file
    pub class: Option<String>,
    /// Memory budget in bytes
    pub memory: u64,
    /// Term normalization
    pub normalize: bool,
    /// Add source URLs to indexed text
    pub inject_url: bool,
    /// Keep document content
    pub store_docs: bool,
    /// Stemmer name
    pub stemmer: Option<String>,
    /// Stop words, lower-cased
    pub stopwords: Vec<String>,
    /// Indexed fields, lower-cased
    pub fields: Vec<FieldSpec>,
    /// Metadata tags, lower-cased
    pub metadata: Vec<String>,
    /// Forward metadata, lower-cased
    pub forward: Vec<String>,
    /// Backward metadata, lower-cased
    pub backward: Vec<String>,
}

impl BuildConfig {
    /// Validate required keys and resolve defaults
    pub fn from_params(params: &ParameterStore) -> Result<Self, BuildError> {
        for key in REQUIRED_PARAMETERS {
            if !params.exists(key) {
                return Err(BuildError::MissingRequiredParameter {
                    key: key.to_string(),
                });
            }
        }
        let index = required_path(params, "index")?;
        let document_root = required_path(params, "corpus.path")?;

        let mut fields: Vec<FieldSpec> = Vec::new();
        for node in params.nodes("field") {
            let name = canonical_name(&node.get_string("name", ""));
            if name.is_empty() {
                continue;
            }
            let numeric = node.get_bool("numeric", false);
            match fields.iter_mut().find(|f| f.name == name) {
                Some(existing) => existing.numeric |= numeric,
                None => fields.push(FieldSpec { name, numeric }),
            }
        }

        Ok(BuildConfig {
            index,
            corpus: CorpusPaths {
                document_root,
                anchor_text: optional_path(params, "corpus.inlink"),
                offset_annotations: optional_path(params, "corpus.annotations"),
                offset_metadata: optional_path(params, "corpus.metadata"),
            },
            class: optional_string(params, "corpus.class").map(|c| canonical_name(&c)),
            memory: params.get_uint64("memory", DEFAULT_MEMORY),
            normalize: params.get_bool("normalize", true),
            inject_url: params.get_bool("injectURL", true),
            store_docs: params.get_bool("storeDocs", true),
            stemmer: Some(params.get_string("stemmer.name", DEFAULT_STEMMER))
                .filter(|name| !name.is_empty()),
            stopwords: names(params, "stopper.word"),
            fields,
            metadata: names(params, "metadata.field.name"),
            forward: names(params, "metadata.forward"),
            backward: names(params, "metadata.backward"),
        })
    }

    /// Options handed to the engine before the lifecycle transition
    pub fn to_index_options(&self) -> IndexOptions {
        IndexOptions {
            memory: self.memory,
            normalize: self.normalize,
            stemmer: self.stemmer.clone(),
            stopwords: self.stopwords.clone(),
            store_docs: self.store_docs,
            inject_url: self.inject_url,
            fields: self.fields.clone(),
            forward: self.forward.clone(),
            backward: self.backward.clone(),
        }
    }

    /// Fields and metadata to reconcile into the corpus class schema
    pub fn schema_request(&self) -> SchemaRequest {
        SchemaRequest {
            fields: self.fields.clone(),
            metadata: self.metadata.clone(),
            forward: self.forward.clone(),
            backward: self.backward.clone(),
        }
    }
}

fn required_path(params: &ParameterStore, key: &str) -> Result<PathBuf, BuildError> {
    optional_string(params, key)
        .map(PathBuf::from)
        .ok_or_else(|| BuildError::MissingRequiredParameter {
            key: key.to_string(),
        })
}

fn optional_path(params: &ParameterStore, key: &str) -> Option<PathBuf> {
    optional_string(params, key).map(PathBuf::from)
}

fn optional_string(params: &ParameterStore, key: &str) -> Option<String> {
    Some(params.get_string(key, "")).filter(|value| !value.is_empty())
}

/// Repeated values at `path`, lower-cased, empty and duplicate names dropped
fn names(params: &ParameterStore, path: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in params.get_all(path) {
        let name = canonical_name(&value);
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
