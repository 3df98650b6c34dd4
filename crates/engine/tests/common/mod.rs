//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use docket_core::ParameterStore;
use tempfile::TempDir;

/// Scratch workspace holding a corpus directory and a repository path
pub struct Workspace {
    pub dir: TempDir,
    pub corpus: PathBuf,
    pub index: PathBuf,
}

impl Workspace {
    /// Empty corpus, no repository yet
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus");
        fs::create_dir_all(&corpus).unwrap();
        let index = dir.path().join("repo");
        Workspace { dir, corpus, index }
    }

    /// Write a corpus file relative to the corpus root
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.corpus.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Parameters for building this workspace's corpus
    pub fn params(&self, class: Option<&str>) -> ParameterStore {
        let mut text = String::from("<parameters>");
        text.push_str(&format!("<index>{}</index>", self.index.display()));
        text.push_str("<corpus>");
        text.push_str(&format!("<path>{}</path>", self.corpus.display()));
        if let Some(class) = class {
            text.push_str(&format!("<class>{}</class>", class));
        }
        text.push_str("</corpus>");
        text.push_str(FIELDS);
        text.push_str("</parameters>");
        ParameterStore::from_text(&text).unwrap()
    }
}

/// Field and metadata requests shared by the build tests
pub const FIELDS: &str = r#"
    <metadata>
        <forward>DocNo</forward>
        <forward>kind</forward>
        <backward>docno</backward>
        <field><name>docno</name></field>
    </metadata>
    <field><name>Headline</name></field>
    <field><name>version</name><numeric>true</numeric></field>
    <memory>100m</memory>
    <stopper><word>The</word><word>a</word></stopper>
"#;

/// Read a file, panicking with its path on failure
pub fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}
