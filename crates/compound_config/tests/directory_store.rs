//! Tests for the filesystem-backed document store.

use compound_config::prelude::*;
use std::fs;

#[derive(Debug, Default, Configurable)]
#[config(path = "greeter.json")]
struct Greeter {
    #[config(key = "greeting.text", colorize)]
    text: String,
    #[config(key = "greeting.repeat", required = false)]
    repeat: u8,
}

#[test]
fn missing_file_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryStore::new(dir.path());

    assert!(store.open("nothing.json").unwrap().is_none());
}

#[test]
fn reads_nested_json_documents() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(
        dir.path().join("sub/app.json"),
        r#"{ "server": { "port": 25565, "motd": "hello" } }"#,
    )
    .unwrap();

    let store = DirectoryStore::new(dir.path());
    let document = store.open("sub/app.json").unwrap().unwrap();

    assert_eq!(document.get_as::<u16>("server.port"), Some(25565));
    assert_eq!(document.get_as::<String>("server.motd").as_deref(), Some("hello"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

    let store = DirectoryStore::new(dir.path());
    let err = store.open("bad.json").unwrap_err();
    assert!(matches!(err, StoreError::Parse { ref path, .. } if path == "bad.json"));
}

#[test]
fn non_mapping_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("list.json"), "[1, 2, 3]").unwrap();

    let store = DirectoryStore::new(dir.path());
    let err = store.open("list.json").unwrap_err();
    assert!(matches!(err, StoreError::NotAMapping { found: ValueKind::List, .. }));
}

#[test]
fn binder_reads_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("greeter.json"),
        r#"{ "greeting": { "text": "&eWelcome", "repeat": 3 } }"#,
    )
    .unwrap();

    let binder = Binder::new(DirectoryStore::new(dir.path()));
    let mut greeter = Greeter::default();
    binder.bind(&mut greeter).unwrap();

    assert_eq!(greeter.text, "\u{00A7}eWelcome");
    assert_eq!(greeter.repeat, 3);
}
