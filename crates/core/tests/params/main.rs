//! Parameter store integration tests against full configuration documents

#[path = "../common/mod.rs"]
mod common;

use common::{BAD_PARAMS, GOOD_PARAMS};
use docket_core::params::{read_params_file, ParamPathError, ParameterStore, ParseError};

const REQUIRED: [&str; 3] = ["index", "corpus", "corpus.path"];

fn has_required(params: &ParameterStore) -> bool {
    REQUIRED.iter().all(|key| params.exists(key))
}

#[test]
fn good_document_has_required_parameters() {
    let params = ParameterStore::from_text(GOOD_PARAMS).unwrap();
    assert!(has_required(&params));
}

#[test]
fn bad_documents_fail_or_miss_required_parameters() {
    for (i, text) in BAD_PARAMS.iter().enumerate() {
        let mut params = ParameterStore::new();
        match params.load(text) {
            Err(_) => {}
            Ok(()) => assert!(!has_required(&params), "bad document {} passed", i + 1),
        }
    }
}

#[test]
fn corpus_without_path_reports_missing() {
    let params = ParameterStore::from_text(BAD_PARAMS[2]).unwrap();
    assert!(params.exists("index"));
    assert!(!params.exists("corpus"));
    assert!(!params.exists("corpus.path"));
}

#[test]
fn truncated_documents_are_rejected() {
    assert!(matches!(
        ParameterStore::from_text(BAD_PARAMS[3]),
        Err(ParseError::Unterminated { .. })
    ));
    assert!(matches!(
        ParameterStore::from_text(BAD_PARAMS[4]),
        Err(ParseError::MismatchedEnd { .. })
    ));
}

#[test]
fn read_write_sequence() {
    let mut params = ParameterStore::new();
    params.load(GOOD_PARAMS).unwrap();

    assert!(params.get_bool("normalize", false));
    assert_eq!(params.get_int("memory", 200_000_000), 100_000_000);
    assert_eq!(params.get_double("dummy.double", 3.3), 3.3);
    assert_eq!(params.get_int64("dummy.int64", 1_234_567_890), 1_234_567_890);
    assert_eq!(params.get_string("stemmer.name", "porter"), "krovetz");
    assert!(params.exists("stemmer.name"));

    params.set_string("stemmer.name", "notkrovetz").unwrap();
    assert_eq!(params.get_string("stemmer.name", ""), "notkrovetz");

    params.set_bool("normalize", false).unwrap();
    assert!(!params.get_bool("normalize", true));

    params.set_int("memory", 25_000_000).unwrap();
    assert_eq!(params.get_int("memory", 0), 25_000_000);

    params.set_uint64("dummy.int64", 617_283_945).unwrap();
    assert_eq!(params.get_int64("dummy.int64", 0), 617_283_945);

    params.set_double("dummy.double", 10.89).unwrap();
    let value = params.get_double("dummy.double", 0.0);
    assert!((value - 10.89).abs() < 0.01);

    params.remove("parameters.corpus.path");
    assert!(params.get_string("parameters.corpus.path", "").is_empty());

    params.clear();
    assert_eq!(params.size(), 0);
}

#[test]
fn repeated_groups_are_ordered() {
    let params = ParameterStore::from_text(GOOD_PARAMS).unwrap();

    let forward = params.get_all("metadata.forward");
    assert_eq!(forward.len(), 10);
    assert_eq!(forward.first().map(String::as_str), Some("odmver"));
    assert_eq!(forward.last().map(String::as_str), Some("docver"));

    assert_eq!(params.get_all("metadata.field.name").len(), 10);
    assert_eq!(params.get_all("stopper.word"), vec!["a", "an", "the", "as"]);

    let fields = params.nodes("field");
    assert_eq!(fields.len(), 15);
    let version = fields
        .iter()
        .find(|f| f.get_string("name", "") == "version")
        .unwrap();
    assert!(version.get_bool("numeric", false));
    assert!(!fields[0].get_bool("numeric", false));
    assert_eq!(params.get_string("field[1].name", ""), "about");
}

#[test]
fn file_round_trip_through_to_xml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("effective.xml");

    let params = ParameterStore::from_text(GOOD_PARAMS).unwrap();
    std::fs::write(&path, params.to_xml()).unwrap();

    let text = read_params_file(&path).unwrap();
    let reloaded = ParameterStore::from_text(&text).unwrap();
    assert_eq!(reloaded.get_all("metadata.backward"), params.get_all("metadata.backward"));
    assert_eq!(reloaded.get_string("corpus.metadata", ""), "repo/base/meta");
    assert_eq!(reloaded.size(), params.size());
}

#[test]
fn root_element_name_never_holds_a_value() {
    let mut params =
        ParameterStore::from_text("<parameters><parameters>x</parameters></parameters>").unwrap();
    assert!(!params.exists("parameters"));
    assert_eq!(params.get_string("parameters", "none"), "none");
    assert!(params.get_all("parameters").is_empty());

    assert_eq!(
        params.set_string("parameters", "y"),
        Err(ParamPathError::RootNotAssignable)
    );
    assert_eq!(params.get_string("parameters", "none"), "none");

    params.set_string("parameters.index", "repo").unwrap();
    assert_eq!(params.get_string("index", ""), "repo");
    assert!(params.exists("parameters.index"));
}

#[test]
fn merged_files_accumulate_stopwords_and_override_scalars() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.xml");
    let local = dir.path().join("local.xml");
    std::fs::write(
        &base,
        "<parameters><memory>1g</memory><stopper><word>a</word></stopper></parameters>",
    )
    .unwrap();
    std::fs::write(
        &local,
        "<parameters><memory>2g</memory><stopper><word>the</word></stopper></parameters>",
    )
    .unwrap();

    let mut params = ParameterStore::new();
    params
        .load_command_line([base.to_str().unwrap(), local.to_str().unwrap()])
        .unwrap();
    assert_eq!(params.get_all("stopper.word"), vec!["a", "the"]);
    assert_eq!(params.get_uint64("memory", 0), 2_000_000_000);
}
