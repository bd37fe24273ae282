//! Host lifecycle: folder setup, discovery, loading and teardown.

mod common;

use common::*;
use compound_config::prelude::*;
use compound_system::prelude::*;
use std::fs;

#[derive(Default, Configurable)]
#[config(path = "settings.json")]
struct HostSettingsProbe {
    #[config(key = "motd")]
    motd: String,
}

#[test]
fn enable_creates_components_folder_and_loads() {
    let dir = tempfile::tempdir().unwrap();
    let log = call_log();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new());

    let report = host
        .enable(vec![
            probe("chat", &log).depends_on("database"),
            probe("database", &log),
        ])
        .unwrap();

    assert_eq!(report.loaded, ["database", "chat"]);
    assert!(dir.path().join("components").is_dir());
    assert_eq!(host.state(), HostState::Enabled);
    assert_eq!(host.component_as::<Probe>("chat").name, "chat");
    assert!(host.registry().is_some());
}

#[test]
fn enable_accepts_groups() {
    struct Standard;
    impl ComponentGroup for Standard {
        fn build(self) -> ComponentGroupBuilder {
            ComponentGroupBuilder::new()
                .add(ComponentDescriptor::of::<Plain>("database"))
                .add(ComponentDescriptor::of::<Plain>("chat"))
                .add(ComponentDescriptor::of::<Plain>("emotes"))
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new())
        .with_components_folder("modules");

    let report = host.enable(Standard.build().disable("emotes")).unwrap();

    assert_eq!(report.loaded, ["database", "chat"]);
    assert!(dir.path().join("modules").is_dir());
}

#[test]
fn folder_creation_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::write(&data, "not a folder").unwrap();
    let log = call_log();
    let mut host = ComponentHost::new(&data, MemoryStore::new());

    let err = host.enable(vec![probe("chat", &log)]).unwrap_err();

    assert!(matches!(err, SetupError::ComponentFolder { .. }));
    assert_eq!(host.state(), HostState::Disabled);
    assert!(host.registry().is_none());
    assert!(calls(&log).is_empty());
}

#[test]
fn discovery_failure_is_fatal() {
    struct Broken;
    impl Discovery for Broken {
        fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
            Err("manifest unreadable".into())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new());

    let err = host.enable(Broken).unwrap_err();

    assert!(err.to_string().contains("manifest unreadable"));
    assert_eq!(host.state(), HostState::Disabled);
}

#[test]
fn disable_tears_down_and_drops_registry() {
    let dir = tempfile::tempdir().unwrap();
    let log = call_log();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new());
    host.enable(vec![
        probe("database", &log),
        probe("chat", &log).depends_on("database"),
    ])
    .unwrap();
    log.lock().clear();

    let report = host.disable();

    assert_eq!(report.unloaded, ["chat", "database"]);
    assert_eq!(calls(&log), ["unload:chat", "unload:database"]);
    assert_eq!(host.state(), HostState::Disabled);
    assert!(host.registry().is_none());
    assert!(host.report().is_some());
}

#[test]
fn open_reads_config_files_from_the_data_folder() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("settings.json"),
        r#"{ "motd": "welcome" }"#,
    )
    .unwrap();
    fs::write(dir.path().join("chat.json"), r#"{ "port": 7 }"#).unwrap();
    let log = call_log();
    let mut host = ComponentHost::open(dir.path());

    host.enable(vec![probe("chat", &log)]).unwrap();
    assert_eq!(host.component_as::<Probe>("chat").port, 7);

    let mut settings = HostSettingsProbe::default();
    host.inject_config(&mut settings).unwrap();
    assert_eq!(settings.motd, "welcome");

    let mut other = HostSettingsProbe::default();
    host.inject_config_with_path(&mut other, "chat.json", None)
        .unwrap();
    assert_eq!(other.motd, "welcome");
}

#[test]
#[should_panic(expected = "Cannot enable twice")]
fn enable_twice_panics() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new());
    host.enable(Vec::<ComponentDescriptor>::new()).unwrap();
    let _ = host.enable(Vec::<ComponentDescriptor>::new());
}

#[test]
#[should_panic(expected = "Call enable() first")]
fn disable_before_enable_panics() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new());
    host.disable();
}

#[test]
#[should_panic(expected = "only available while enabled")]
fn component_lookup_after_disable_panics() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = ComponentHost::new(dir.path(), MemoryStore::new());
    host.enable(vec![ComponentDescriptor::of::<Plain>("plain")])
        .unwrap();
    host.disable();
    let _ = host.component("plain");
}
