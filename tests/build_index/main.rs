//! End-to-end build tests: parameter files, the builder and the binary

#[path = "../common/mod.rs"]
mod common;

use std::process::Command;

use common::{repo_file, BlogFixture};
use docket::{
    BuildError, FileRepository, IndexBuilder, IndexEngine, LifecycleState, NullProgress,
    ParameterStore, ProgressEvent, RecordingProgress, SourceError,
};

fn load(args: &[&str]) -> ParameterStore {
    let mut params = ParameterStore::new();
    params.load_command_line(args).unwrap();
    params
}

#[test]
fn parameter_file_builds_repository() {
    let fixture = BlogFixture::new();
    let file = fixture.params_file();
    let params = load(&[file.to_str().unwrap(), "-memory=2g"]);
    assert_eq!(params.get_uint64("memory", 0), 2_000_000_000);

    let mut progress = RecordingProgress::new();
    let report = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut progress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Created);
    assert!(report.schema_changed);
    assert_eq!((report.seen, report.indexed, report.added), (3, 3, 3));

    let events = progress.into_events();
    assert_eq!(events.first(), Some(&ProgressEvent::Created(fixture.index.clone())));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Finished { seen: 3, indexed: 3 })
    );
    assert!(repo_file(&fixture.index, "manifest").is_file());
}

#[test]
fn rebuild_recovers_and_keeps_schema() {
    let fixture = BlogFixture::new();
    let params = ParameterStore::from_text(&fixture.params_text()).unwrap();
    IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    let schema = std::fs::read(repo_file(&fixture.index, "schema.json")).unwrap();

    let report = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Recovered);
    assert!(!report.schema_changed);
    assert_eq!(report.seen, 6);
    assert_eq!(
        std::fs::read(repo_file(&fixture.index, "schema.json")).unwrap(),
        schema
    );

    let mut repo = FileRepository::new();
    repo.open(&fixture.index, &mut NullProgress).unwrap();
    let spec = repo.schema_spec("html").unwrap().unwrap();
    assert!(spec.field("version").unwrap().numeric);
    assert!(spec.has_forward("docno"));
    assert!(spec.has_backward("docno"));
}

#[test]
fn corpus_inside_index_survives_create_and_rebuild() {
    let fixture = BlogFixture::inside_index();
    let params = ParameterStore::from_text(&fixture.params_text()).unwrap();

    let report = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Created);
    assert_eq!((report.seen, report.added, report.skipped), (3, 3, 0));
    assert!(fixture.corpus.join("welcome.html").is_file());
    assert!(fixture.corpus.join("2024/launch.html").is_file());

    // A damaged manifest forces a recreate over the same directory
    let manifest = repo_file(&fixture.index, "manifest");
    let mut bytes = std::fs::read(&manifest).unwrap();
    bytes[10] ^= 0xFF;
    std::fs::write(&manifest, bytes).unwrap();

    let report = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Created);
    assert_eq!((report.seen, report.added), (3, 3));
    assert!(fixture.corpus.join("about.html").is_file());
}

#[test]
fn command_line_overrides_file_values() {
    let fixture = BlogFixture::new();
    let file = fixture.params_file();
    let other = fixture.dir.path().join("elsewhere");
    let params = load(&[
        file.to_str().unwrap(),
        &format!("-index={}", other.display()),
    ]);

    IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert!(repo_file(&other, "manifest").is_file());
    assert!(!fixture.index.exists());
}

#[test]
fn missing_corpus_path_is_reported_by_key() {
    let fixture = BlogFixture::new();
    let text = fixture
        .params_text()
        .replace(&format!("<path>{}</path>", fixture.corpus.display()), "");
    let params = ParameterStore::from_text(&text).unwrap();
    let err = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap_err();
    assert_eq!(err.missing_key(), Some("corpus.path"));
    assert!(!fixture.index.exists());
}

#[test]
fn oversized_parameter_file_is_rejected() {
    let fixture = BlogFixture::new();
    let padding = "<!-- padding -->".repeat(600);
    let path = fixture.write_params("big.xml", &format!("<parameters>{}</parameters>", padding));

    let mut params = ParameterStore::new();
    let err: BuildError = params
        .load_command_line([path.to_str().unwrap()])
        .unwrap_err()
        .into();
    assert!(matches!(
        err,
        BuildError::Source(SourceError::FileTooLarge { .. })
    ));
}

#[test]
fn binary_prints_counts() {
    let fixture = BlogFixture::new();
    let file = fixture.params_file();
    let output = Command::new(env!("CARGO_BIN_EXE_docket-build"))
        .arg(&file)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("state: created"), "{}", stdout);
    assert!(stdout.contains("documents indexed: 3"), "{}", stdout);
}

#[test]
fn binary_fails_without_required_parameters() {
    let fixture = BlogFixture::new();
    let file = fixture.write_params("empty.xml", "<parameters><memory>1g</memory></parameters>");
    let output = Command::new(env!("CARGO_BIN_EXE_docket-build"))
        .arg(&file)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing required parameter 'index'"), "{}", stderr);

    let usage = Command::new(env!("CARGO_BIN_EXE_docket-build"))
        .output()
        .unwrap();
    assert_eq!(usage.status.code(), Some(2));
}
