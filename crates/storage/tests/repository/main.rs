//! FileRepository lifecycle, persistence and recovery tests

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use docket_core::{
    DocumentId, Error, FieldSpec, IndexEngine, MetadataPair, ProgressEvent, ProgressSink,
    SchemaSpec,
};
use docket_storage::{FileRepository, RepositoryPaths};
use tempfile::tempdir;

#[derive(Default)]
struct Events(Vec<ProgressEvent>);

impl ProgressSink for Events {
    fn report(&mut self, event: ProgressEvent) {
        self.0.push(event);
    }
}

fn populate(root: &Path) {
    let mut repo = FileRepository::new();
    repo.create(root, &mut Events::default()).unwrap();
    repo.set_document_root(root).unwrap();
    let a = repo.add_string("first", "text", &[]).unwrap();
    repo.add_string("second", "text", &[]).unwrap();
    repo.add_string(
        "third",
        "html",
        &[MetadataPair::new("docno", "00111"), MetadataPair::new("kind", "blog1")],
    )
    .unwrap();
    repo.delete_document(a).unwrap();
    repo.close().unwrap();
}

#[test]
fn manifest_marks_created_repository() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("repo");
    let mut repo = FileRepository::new();
    assert!(!repo.manifest_exists(&root));

    let mut events = Events::default();
    repo.create(&root, &mut events).unwrap();
    assert!(repo.manifest_exists(&root));
    assert_eq!(events.0, vec![ProgressEvent::Created(root.clone())]);
    assert!(repo.repository_uuid().is_some());
}

#[test]
fn reopen_restores_counters() {
    let dir = tempdir().unwrap();
    populate(dir.path());

    let mut repo = FileRepository::new();
    let mut events = Events::default();
    repo.open(dir.path(), &mut events).unwrap();
    assert_eq!(repo.documents_seen(), 3);
    assert_eq!(repo.documents_indexed(), 2);
    assert_eq!(events.0, vec![ProgressEvent::Opened(dir.path().to_path_buf())]);

    repo.set_document_root(dir.path()).unwrap();
    let id = repo.add_string("fourth", "text", &[]).unwrap();
    assert_eq!(id, DocumentId(4));
}

#[test]
fn create_discards_prior_content() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join("stray.bin"), b"junk").unwrap();

    let mut repo = FileRepository::new();
    repo.create(dir.path(), &mut Events::default()).unwrap();
    assert_eq!(repo.documents_seen(), 0);
    assert!(!dir.path().join("stray.bin").exists());
    assert!(dir.path().join("manifest").exists());
}

#[test]
fn open_without_manifest_fails() {
    let dir = tempdir().unwrap();
    let mut repo = FileRepository::new();
    let err = repo.open(dir.path(), &mut Events::default()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn recover_healthy_repository() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let mut repo = FileRepository::new();
    assert!(repo.recover_repository(dir.path()).unwrap());
}

#[test]
fn recover_truncates_torn_journal_tail() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let journal = RepositoryPaths::from_root(dir.path()).journal();
    let mut file = OpenOptions::new().append(true).open(&journal).unwrap();
    file.write_all(br#"{"op":"add","id":5,"class":"te"#).unwrap();
    drop(file);

    let mut repo = FileRepository::new();
    assert!(repo.recover_repository(dir.path()).unwrap());
    repo.open(dir.path(), &mut Events::default()).unwrap();
    assert_eq!(repo.documents_seen(), 3);
    assert_eq!(repo.documents_indexed(), 2);
}

#[test]
fn recover_reports_corrupt_manifest_as_unrecoverable() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let manifest = RepositoryPaths::from_root(dir.path()).manifest();
    let mut bytes = fs::read(&manifest).unwrap();
    bytes[10] ^= 0xFF;
    fs::write(&manifest, bytes).unwrap();

    let mut repo = FileRepository::new();
    assert!(!repo.recover_repository(dir.path()).unwrap());
    assert!(matches!(
        repo.open(dir.path(), &mut Events::default()),
        Err(Error::Corruption { .. })
    ));
}

#[test]
fn recover_reports_corrupt_journal_as_unrecoverable() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let journal = RepositoryPaths::from_root(dir.path()).journal();
    let mut file = OpenOptions::new().append(true).open(&journal).unwrap();
    file.write_all(b"garbage\n").unwrap();
    drop(file);

    let mut repo = FileRepository::new();
    assert!(!repo.recover_repository(dir.path()).unwrap());
}

#[test]
fn recover_without_manifest_is_negative() {
    let dir = tempdir().unwrap();
    let mut repo = FileRepository::new();
    assert!(!repo.recover_repository(dir.path()).unwrap());
}

#[test]
fn second_handle_is_locked_out() {
    let dir = tempdir().unwrap();
    let mut first = FileRepository::new();
    first.create(dir.path(), &mut Events::default()).unwrap();

    let mut second = FileRepository::new();
    assert!(matches!(
        second.open(dir.path(), &mut Events::default()),
        Err(Error::InvalidOperation(_))
    ));

    first.close().unwrap();
    second.open(dir.path(), &mut Events::default()).unwrap();
}

#[test]
fn schema_persists_across_sessions() {
    let dir = tempdir().unwrap();
    let mut repo = FileRepository::new();
    repo.create(dir.path(), &mut Events::default()).unwrap();

    let mut spec = repo.schema_spec("HTML").unwrap().unwrap();
    assert_eq!(spec.class, "html");
    spec.fields.push(FieldSpec::numeric("version"));
    spec.forward.push("docno".to_string());
    repo.apply_schema_spec(&spec).unwrap();
    repo.close().unwrap();

    repo.open(dir.path(), &mut Events::default()).unwrap();
    let stored: SchemaSpec = repo.schema_spec("html").unwrap().unwrap();
    assert_eq!(stored, spec);
}

#[test]
fn add_file_infers_class_and_records_source() {
    let dir = tempdir().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    let page = corpus.join("page.html");
    fs::write(&page, "<html><title>t</title></html>").unwrap();

    let repo_root = dir.path().join("repo");
    let mut repo = FileRepository::new();
    repo.create(&repo_root, &mut Events::default()).unwrap();
    repo.set_document_root(&corpus).unwrap();

    let id = repo.add_file(&page, None).unwrap();
    let explicit = repo.add_file(&page, Some("xml")).unwrap();
    assert_ne!(id, explicit);
    assert_eq!(repo.documents_indexed(), 2);

    let journal = fs::read_to_string(RepositoryPaths::from_root(&repo_root).journal()).unwrap();
    assert!(journal.contains(r#""source":"page.html""#));
    assert!(journal.contains(r#""class":"xml""#));

    let missing = corpus.join("gone.html");
    assert!(repo.add_file(&missing, None).unwrap_err().is_not_found());
}
