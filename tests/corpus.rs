use std::path::Path;

use standoff::cache::{CACHE_FILE_NAME, Snapshot};
use standoff::config::Config;
use standoff::hasher;
use standoff::{AnnotatedDocument, Corpus, Error, LoadOptions};

/// Copy `tests/fixtures/corpus` into a fresh temporary directory.
fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(Path::new("tests/fixtures/corpus"), dir.path());
    dir
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn write(root: &Path, name: &str, content: &str) {
    std::fs::write(root.join(name), content).unwrap();
}

/// Apply `edit` to the first cached document's JSON. With `redigest`, the
/// entry's digest is recomputed so only structural checks can catch the edit.
fn tamper_snapshot(root: &Path, redigest: bool, edit: impl FnOnce(&mut serde_json::Value)) {
    let path = root.join(CACHE_FILE_NAME);
    let mut json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    edit(&mut json["documents"][0]["graph"]);
    if redigest {
        let snapshot = Snapshot::parse(&path, &json.to_string()).unwrap();
        let entry = &snapshot.documents[0];
        let digest = hasher::graph_digest(&entry.fingerprint, &entry.graph);
        json["documents"][0]["digest"] = serde_json::Value::String(digest.0);
    }
    std::fs::write(&path, json.to_string()).unwrap();
}

fn keys(corpus: &Corpus) -> Vec<&str> {
    corpus.documents().keys().map(String::as_str).collect()
}

#[test]
fn flat_load_resolves_every_document() {
    let dir = fixture();
    let corpus = Corpus::load(dir.path(), false, false).unwrap();

    assert_eq!(keys(&corpus), vec!["doc1", "doc2"]);
    assert_eq!(corpus.cache_path(), None);
    assert!(!dir.path().join(CACHE_FILE_NAME).exists());

    let doc1 = corpus.get("doc1").unwrap().graph();
    assert_eq!(doc1.entities().len(), 4);
    assert_eq!(doc1.relations().len(), 1);
    assert_eq!(doc1.events().len(), 1);
    assert_eq!(doc1.attributes().len(), 1);
    assert_eq!(doc1.attributes_of("E1").len(), 1);
    assert!(doc1.get("#1").is_none());

    let doc2 = corpus.get("doc2").unwrap();
    assert_eq!(doc2.graph().entity_by_id("T1").unwrap().text, "Zürich");
    assert_eq!(doc2.graph().entity_by_id("T2").unwrap().text, "Switzerland");
}

#[test]
fn recursive_load_descends_into_subdirectories() {
    let dir = fixture();
    let corpus = Corpus::load(dir.path(), true, false).unwrap();
    assert_eq!(keys(&corpus), vec!["doc1", "doc2", "doc3"]);
    assert_eq!(corpus.get("doc3").unwrap().text(), "Carol met Dave.\n");
}

#[test]
fn cached_loads_match_an_uncached_load() {
    let dir = fixture();
    let fresh = Corpus::load(dir.path(), true, false).unwrap();

    let first = Corpus::load(dir.path(), true, true).unwrap();
    assert_eq!(first.cache_path(), Some(dir.path().join(CACHE_FILE_NAME).as_path()));
    assert!(dir.path().join(CACHE_FILE_NAME).exists());

    let second = Corpus::load(dir.path(), true, true).unwrap();
    assert_eq!(first.documents(), fresh.documents());
    assert_eq!(second.documents(), fresh.documents());
}

#[test]
fn edited_document_is_reparsed_despite_the_cache() {
    let dir = fixture();
    Corpus::load(dir.path(), false, true).unwrap();

    write(dir.path(), "doc2.ann", "T1\tLocation 0 6\tZürich\n");
    let corpus = Corpus::load(dir.path(), false, true).unwrap();
    assert_eq!(corpus.get("doc2").unwrap().graph().entities().len(), 1);

    let snapshot = Snapshot::read(&dir.path().join(CACHE_FILE_NAME)).unwrap();
    let cached = snapshot.into_lookup();
    assert_eq!(cached.get(Path::new("doc2.ann")).unwrap().graph.entities().len(), 1);
}

#[test]
fn corrupt_cache_is_rebuilt() {
    let dir = fixture();
    write(dir.path(), CACHE_FILE_NAME, "not a snapshot");

    let corpus = Corpus::load(dir.path(), false, true).unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(Snapshot::read(&dir.path().join(CACHE_FILE_NAME)).unwrap().documents.len(), 2);
}

#[test]
fn relabelled_snapshot_entry_is_reparsed() {
    let dir = fixture();
    let fresh = Corpus::load(dir.path(), false, false).unwrap();
    Corpus::load(dir.path(), false, true).unwrap();

    tamper_snapshot(dir.path(), false, |graph| {
        graph["entities"][0]["label"] = "ZZ".into();
    });
    let corpus = Corpus::load(dir.path(), false, true).unwrap();
    assert_eq!(corpus.documents(), fresh.documents());

    let cached = Snapshot::read(&dir.path().join(CACHE_FILE_NAME)).unwrap().into_lookup();
    assert_eq!(cached.get(Path::new("doc1.ann")).unwrap().graph, *fresh.get("doc1").unwrap().graph());
}

#[test]
fn out_of_range_snapshot_index_is_reparsed() {
    let dir = fixture();
    let fresh = Corpus::load(dir.path(), false, false).unwrap();
    Corpus::load(dir.path(), false, true).unwrap();

    tamper_snapshot(dir.path(), true, |graph| {
        graph["relations"][0]["arguments"][0]["entity"] = 99.into();
    });
    let corpus = Corpus::load(dir.path(), false, true).unwrap();
    assert_eq!(corpus.documents(), fresh.documents());
}

#[test]
fn snapshot_text_mismatch_is_reparsed() {
    let dir = fixture();
    let fresh = Corpus::load(dir.path(), false, false).unwrap();
    Corpus::load(dir.path(), false, true).unwrap();

    tamper_snapshot(dir.path(), true, |graph| {
        graph["entities"][0]["text"] = "Bob".into();
    });
    let corpus = Corpus::load(dir.path(), false, true).unwrap();
    assert_eq!(corpus.get("doc1").unwrap().graph().entity_by_id("T1").unwrap().text, "Alice");
    assert_eq!(corpus.documents(), fresh.documents());
}

#[test]
fn parse_error_names_the_document_and_line() {
    let dir = fixture();
    write(dir.path(), "bad.ann", "T1\tPerson 0 3\tAli\nT2 Person\n");
    write(dir.path(), "bad.txt", "Alice");

    let err = Corpus::load(dir.path(), false, false).unwrap_err();
    let Error::Document { path, .. } = &err else {
        panic!("expected document error, got {err:?}");
    };
    assert!(path.ends_with("bad.ann"), "{}", path.display());
    assert!(matches!(err.root_cause(), Error::Parse { line: 2, .. }), "{err:?}");
}

#[test]
fn dangling_reference_fails_the_whole_load() {
    let dir = fixture();
    write(dir.path(), "broken.ann", "T1\tPerson 0 5\tAlice\nR1\tKnows Arg1:T1 Arg2:T99\n");
    write(dir.path(), "broken.txt", "Alice");

    let err = Corpus::load(dir.path(), false, false).unwrap_err();
    let Error::DanglingReference { missing, referencing } = err.root_cause() else {
        panic!("expected dangling reference, got {err:?}");
    };
    assert_eq!(missing, "T99");
    assert_eq!(referencing, "R1");
}

#[test]
fn missing_text_file_is_file_not_found() {
    let dir = fixture();
    write(dir.path(), "lonely.ann", "T1\tPerson 0 3\tAli\n");

    let err = Corpus::load(dir.path(), false, false).unwrap_err();
    let Error::FileNotFound { path } = err.root_cause() else {
        panic!("expected missing file, got {err:?}");
    };
    assert!(path.ends_with("lonely.txt"), "{}", path.display());
}

#[test]
fn stem_collision_only_matters_when_recursive() {
    let dir = fixture();
    write(dir.path(), "sub/doc1.ann", "T1\tPerson 0 5\tCarol\n");
    write(dir.path(), "sub/doc1.txt", "Carol");

    assert_eq!(Corpus::load(dir.path(), false, false).unwrap().len(), 2);
    let err = Corpus::load(dir.path(), true, false).unwrap_err();
    let Error::KeyCollision { key, .. } = err else {
        panic!("expected collision, got {err:?}");
    };
    assert_eq!(key, "doc1");
}

#[test]
fn root_must_be_a_directory() {
    let dir = fixture();
    let err = Corpus::load(&dir.path().join("doc1.txt"), false, false).unwrap_err();
    assert!(matches!(err, Error::NotADirectory { .. }), "{err:?}");
}

#[test]
fn parallel_load_matches_sequential_load() {
    let dir = fixture();
    let sequential = Corpus::load(dir.path(), true, false).unwrap();
    let options = LoadOptions {
        jobs: 4,
        recursive: true,
        ..LoadOptions::default()
    };
    let parallel = Corpus::load_with(dir.path(), &options).unwrap();
    assert_eq!(parallel.documents(), sequential.documents());
}

#[test]
fn parallel_load_reports_the_first_failing_path() {
    let dir = fixture();
    write(dir.path(), "a_bad.ann", "T1\tPerson 9 3\tx\n");
    write(dir.path(), "a_bad.txt", "Alice");
    write(dir.path(), "z_bad.ann", "R1\tKnows Arg1:T1 Arg2:T2\n");
    write(dir.path(), "z_bad.txt", "Alice");

    let options = LoadOptions {
        jobs: 4,
        ..LoadOptions::default()
    };
    let err = Corpus::load_with(dir.path(), &options).unwrap_err();
    let Error::Document { path, .. } = &err else {
        panic!("expected document error, got {err:?}");
    };
    assert!(path.ends_with("a_bad.ann"), "{}", path.display());
}

#[test]
fn config_filters_exclude_documents() {
    let dir = fixture();
    let options = LoadOptions {
        config: Config::parse("exclude = [\"doc2\"]").unwrap(),
        ..LoadOptions::default()
    };
    let corpus = Corpus::load_with(dir.path(), &options).unwrap();
    assert_eq!(keys(&corpus), vec!["doc1"]);
}

#[test]
fn export_all_writes_one_file_per_document() {
    let dir = fixture();
    let corpus = Corpus::load(dir.path(), true, false).unwrap();
    let out = dir.path().join("out").join("json");

    let written = corpus.export_all(&out).unwrap();
    assert_eq!(
        written,
        vec![out.join("doc1.json"), out.join("doc2.json"), out.join("doc3.json")]
    );

    let restored = AnnotatedDocument::import(&out.join("doc1.json")).unwrap();
    let original = corpus.get("doc1").unwrap();
    assert_eq!(restored.key(), "doc1");
    assert_eq!(restored.text(), original.text());
    assert_eq!(restored.graph().to_standoff(), original.graph().to_standoff());
    assert_eq!(restored.sentences(), original.sentences());
}
