//! Shared fixtures for end-to-end build tests
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Parameter document for a blog corpus; `{index}` and `{corpus}` are
/// substituted per test
pub const BLOG_PARAMS: &str = r#"<parameters>
    <index>{index}</index>
    <corpus>
        <path>{corpus}</path>
        <class>html</class>
    </corpus>
    <metadata>
        <forward>docno</forward>
        <forward>kind</forward>
        <backward>docno</backward>
        <field><name>docno</name></field>
        <field><name>kind</name></field>
    </metadata>
    <field><name>headline</name></field>
    <field><name>author</name></field>
    <field><name>version</name><numeric>true</numeric></field>
    <memory>100m</memory>
    <stemmer><name>krovetz</name></stemmer>
    <stopper><word>a</word><word>an</word><word>the</word></stopper>
</parameters>
"#;

/// A scratch directory with a small blog corpus
pub struct BlogFixture {
    pub dir: TempDir,
    pub corpus: PathBuf,
    pub index: PathBuf,
}

impl BlogFixture {
    /// Corpus of three pages, one of them nested
    pub fn new() -> Self {
        Self::with_layout("repo", "corpus")
    }

    /// Corpus kept inside the repository directory
    pub fn inside_index() -> Self {
        Self::with_layout("repo/base", "repo/base/corpus")
    }

    fn with_layout(index: &str, corpus: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join(corpus);
        let index = dir.path().join(index);
        fs::create_dir_all(corpus.join("2024")).unwrap();
        fs::write(
            corpus.join("welcome.html"),
            "<html><head><title>Welcome</title></head><body>hello</body></html>",
        )
        .unwrap();
        fs::write(
            corpus.join("about.html"),
            "<html><head><title>About</title></head><body>about us</body></html>",
        )
        .unwrap();
        fs::write(
            corpus.join("2024/launch.html"),
            "<html><head><title>Launch</title></head><body>v1</body></html>",
        )
        .unwrap();
        BlogFixture { dir, corpus, index }
    }

    /// Parameter text pointing at this fixture
    pub fn params_text(&self) -> String {
        BLOG_PARAMS
            .replace("{index}", &self.index.display().to_string())
            .replace("{corpus}", &self.corpus.display().to_string())
    }

    /// Write the parameter file and return its path
    pub fn params_file(&self) -> PathBuf {
        let path = self.dir.path().join("build.xml");
        fs::write(&path, self.params_text()).unwrap();
        path
    }

    /// Write arbitrary parameter text next to the corpus
    pub fn write_params(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }
}

/// Path of a repository file
pub fn repo_file(index: &Path, name: &str) -> PathBuf {
    index.join(name)
}
