//! Build sessions against the file-backed repository
//!
//! These tests drive the lifecycle, reconciliation and ingestion layers
//! through `FileRepository` and verify:
//! - Create / recover / recreate decisions from on-disk evidence
//! - Idempotent schema reconciliation across sessions
//! - Counter invariants through adds, string documents and deletes
//! - Walk skipping and abort behavior

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use common::{read, Workspace};
use docket_core::{
    DocumentId, IndexEngine, MetadataPair, MetadataPairSet, ProgressEvent, SchemaRequest,
};
use docket_engine::testing::{FailPoint, FailingEngine, MemoryEngine};
use docket_engine::{
    BuildError, CorpusPaths, IndexBuilder, IngestError, LifecycleError, LifecycleMode,
    LifecycleState, NullProgress, RecordingProgress, RepositoryLifecycle,
};
use docket_storage::{FileRepository, RepositoryPaths};

#[test]
fn first_build_creates_second_recovers() {
    let ws = Workspace::new();
    ws.write("a.html", "<html><title>a</title></html>");
    ws.write("b.html", "<html><title>b</title></html>");
    let params = ws.params(Some("html"));

    let mut progress = RecordingProgress::new();
    let first = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut progress)
        .unwrap();
    assert_eq!(first.state, LifecycleState::Created);
    assert!(first.schema_changed);
    assert_eq!((first.seen, first.indexed), (2, 2));
    assert_eq!(progress.events()[0], ProgressEvent::Created(ws.index.clone()));

    let second = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert_eq!(second.state, LifecycleState::Recovered);
    assert!(!second.schema_changed);
    assert_eq!((second.seen, second.indexed), (4, 4));
}

#[test]
fn reconciliation_leaves_schema_byte_identical() {
    let ws = Workspace::new();
    let params = ws.params(Some("HTML"));
    let schema = RepositoryPaths::from_root(&ws.index).schema();

    IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    let after_first = read(&schema);

    let report = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert!(!report.schema_changed);
    assert_eq!(read(&schema), after_first);

    let stored: serde_json::Value = serde_json::from_slice(&after_first).unwrap();
    let html = &stored["html"];
    assert_eq!(html["forward"], serde_json::json!(["docno", "kind"]));
    assert_eq!(html["backward"], serde_json::json!(["docno"]));
    assert_eq!(html["fields"][0]["name"], "headline");
    assert_eq!(html["fields"][1]["numeric"], true);
}

#[test]
fn corrupt_manifest_is_recreated_not_failed() {
    let ws = Workspace::new();
    ws.write("a.txt", "alpha");
    let params = ws.params(None);
    IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();

    let manifest = RepositoryPaths::from_root(&ws.index).manifest();
    let mut bytes = read(&manifest);
    bytes[10] ^= 0xFF;
    fs::write(&manifest, bytes).unwrap();

    let report = IndexBuilder::new(FileRepository::new())
        .build(&params, &mut NullProgress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Created);
    assert_eq!((report.seen, report.indexed), (1, 1));
}

#[test]
fn counters_follow_adds_and_deletes() {
    let ws = Workspace::new();
    let a = ws.write("a.html", "<html>a</html>");
    let b = ws.write("b.html", "<html>b</html>");

    let mut lifecycle = RepositoryLifecycle::new(FileRepository::new(), &ws.index);
    lifecycle.transition(&mut NullProgress).unwrap();
    lifecycle
        .register_paths(&CorpusPaths::new(&ws.corpus))
        .unwrap();
    let mut pipeline = lifecycle.into_pipeline().unwrap();

    let first = pipeline.add_file(&a, Some("html")).unwrap();
    pipeline.add_file(&b, Some("html")).unwrap();
    let mut metadata = MetadataPairSet::with_capacity(2);
    metadata.set(0, MetadataPair::new("docno", "00111")).unwrap();
    metadata.set(1, MetadataPair::new("kind", "blog1")).unwrap();
    pipeline
        .add_string("<html><title>c</title></html>", "html", &metadata)
        .unwrap();
    pipeline.delete_document(first).unwrap();

    assert_eq!(pipeline.documents_seen(), 3);
    assert_eq!(pipeline.documents_indexed(), 2);

    let err = pipeline.delete_document(DocumentId(99)).unwrap_err();
    assert!(matches!(err, IngestError::Delete { id: DocumentId(99), .. }));
    assert_eq!(pipeline.documents_indexed(), 2);
    pipeline.close(&mut NullProgress).unwrap();

    let mut reopened = FileRepository::new();
    reopened.open(&ws.index, &mut NullProgress).unwrap();
    assert_eq!(reopened.documents_seen(), 3);
    assert_eq!(reopened.documents_indexed(), 2);
}

#[test]
fn walk_aborts_on_unclassifiable_file() {
    let ws = Workspace::new();
    ws.write("a.html", "a");
    ws.write("b.unknown", "b");
    ws.write("c.html", "c");

    let err = IndexBuilder::new(FileRepository::new())
        .build(&ws.params(None), &mut NullProgress)
        .unwrap_err();
    match err {
        BuildError::Ingest(IngestError::AddFile { path, .. }) => {
            assert!(path.ends_with("b.unknown"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut repo = FileRepository::new();
    repo.open(&ws.index, &mut NullProgress).unwrap();
    assert_eq!(repo.documents_seen(), 1);
}

#[test]
fn walk_failure_keeps_earlier_documents() {
    let ws = Workspace::new();
    for name in ["a.txt", "b.txt", "c.txt"] {
        ws.write(name, name);
    }
    let engine = MemoryEngine::new();
    let faulty = FailingEngine::new(engine.clone(), FailPoint::AddFile).after(2);

    let err = IndexBuilder::new(faulty)
        .build(&ws.params(None), &mut NullProgress)
        .unwrap_err();
    assert!(matches!(err, BuildError::Ingest(IngestError::AddFile { .. })));
    assert_eq!(engine.documents_seen(), 2);
    assert_eq!(engine.documents_indexed(), 2);
}

#[test]
fn open_existing_requires_manifest() {
    let ws = Workspace::new();
    let err = IndexBuilder::new(FileRepository::new())
        .mode(LifecycleMode::OpenExisting)
        .build(&ws.params(None), &mut NullProgress)
        .unwrap_err();
    assert!(matches!(
        err,
        BuildError::Lifecycle(LifecycleError::MissingManifest { .. })
    ));

    IndexBuilder::new(FileRepository::new())
        .build(&ws.params(None), &mut NullProgress)
        .unwrap();
    let report = IndexBuilder::new(FileRepository::new())
        .mode(LifecycleMode::OpenExisting)
        .build(&ws.params(None), &mut NullProgress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Opened);
}

#[test]
fn concurrent_session_on_same_path_fails() {
    let ws = Workspace::new();
    let (_, held) = IndexBuilder::new(FileRepository::new())
        .build_open(&ws.params(None), &mut NullProgress)
        .unwrap();

    let mut second = RepositoryLifecycle::new(FileRepository::new(), &ws.index);
    let err = second.transition(&mut NullProgress).unwrap_err();
    assert!(matches!(err, LifecycleError::Repository { .. }));
    assert_eq!(second.state(), LifecycleState::Failed);
    drop(held);
}

#[test]
fn reconciling_unknown_class_leaves_schema_alone() {
    let ws = Workspace::new();
    let mut lifecycle = RepositoryLifecycle::new(FileRepository::new(), &ws.index);
    lifecycle.transition(&mut NullProgress).unwrap();
    let request = SchemaRequest {
        forward: vec!["docno".to_string()],
        ..Default::default()
    };
    assert!(!lifecycle.reconcile_schema("spreadsheet", &request).unwrap());
    assert!(lifecycle.state().is_open());
    drop(lifecycle);

    let report = IndexBuilder::new(FileRepository::new())
        .build(&ws.params(Some("spreadsheet")), &mut NullProgress)
        .unwrap();
    assert_eq!(report.state, LifecycleState::Recovered);
    assert!(!report.schema_changed);
    let stored: serde_json::Value =
        serde_json::from_slice(&read(&RepositoryPaths::from_root(&ws.index).schema())).unwrap();
    assert!(stored.get("spreadsheet").is_none());
}

#[test]
fn options_reach_the_engine_lower_cased() {
    let ws = Workspace::new();
    let engine = MemoryEngine::new();
    IndexBuilder::new(engine.clone())
        .build(&ws.params(Some("html")), &mut NullProgress)
        .unwrap();

    let options = engine.options();
    assert_eq!(options.memory, 100_000_000);
    assert_eq!(options.stopwords, vec!["the", "a"]);
    assert_eq!(options.forward, vec!["docno", "kind"]);
    assert_eq!(options.fields.len(), 2);
    assert_eq!(engine.document_root(), Some(ws.corpus.clone()));
    let spec = engine.stored_spec("html").unwrap();
    assert_eq!(spec.metadata, vec!["docno"]);
}
