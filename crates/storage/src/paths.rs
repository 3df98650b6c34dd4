//! Repository directory layout
//!
//! ```text
//! <root>/
//!   manifest        binary marker, written last on create
//!   schema.json     class -> SchemaSpec
//!   options.json    IndexOptions of the last session
//!   documents.log   JSON-lines add/delete journal
//!   docs/<id>.doc   stored document content
//!   .lock           exclusive lock while open
//! ```

use std::path::{Path, PathBuf};

use docket_core::DocumentId;

/// File locations inside one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPaths {
    root: PathBuf,
}

impl RepositoryPaths {
    /// Layout rooted at `root`
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        RepositoryPaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Repository directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifest marker
    pub fn manifest(&self) -> PathBuf {
        self.root.join("manifest")
    }

    /// Stored schemas
    pub fn schema(&self) -> PathBuf {
        self.root.join("schema.json")
    }

    /// Stored options
    pub fn options(&self) -> PathBuf {
        self.root.join("options.json")
    }

    /// Document journal
    pub fn journal(&self) -> PathBuf {
        self.root.join("documents.log")
    }

    /// Stored document directory
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }

    /// Stored content of one document
    pub fn doc(&self, id: DocumentId) -> PathBuf {
        self.docs_dir().join(format!("{}.doc", id.as_u64()))
    }

    /// Lock file
    pub fn lock(&self) -> PathBuf {
        self.root.join(".lock")
    }

    /// Every entry the repository itself writes, excluding the lock
    ///
    /// Anything else under the root belongs to the caller and is never
    /// touched when the repository is recreated.
    pub fn owned_entries(&self) -> Vec<PathBuf> {
        let mut entries = vec![
            self.manifest(),
            self.schema(),
            self.options(),
            self.journal(),
            self.docs_dir(),
        ];
        for file in ["manifest", "schema.json", "options.json"] {
            entries.push(self.root.join(file).with_extension("tmp"));
        }
        entries
    }
}
