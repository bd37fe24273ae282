//! Runs the demo components against sample configuration.

use compound_system::prelude::*;
use example::{Color, Database, DemoComponents, Greeter, Theme, write_sample_config};
use std::fs;

fn enabled_host(dir: &std::path::Path) -> ComponentHost {
    write_sample_config(dir).unwrap();
    let mut host = ComponentHost::open(dir);
    host.enable(DemoComponents).unwrap();
    host
}

#[test]
fn demo_loads_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let host = enabled_host(dir.path());

    let report = host.report().unwrap();
    assert_eq!(report.loaded, ["database", "greeter", "theme"]);
    assert_eq!(report.failed, ["shop"]);
    assert!(report.is_complete());

    let registry = host.registry().unwrap();
    assert_eq!(
        registry.record("shop").unwrap().fail_reasons().collect::<Vec<_>>(),
        ["missing dependency 'economy'"]
    );
}

#[test]
fn demo_components_are_configured() {
    let dir = tempfile::tempdir().unwrap();
    let host = enabled_host(dir.path());

    let database = host.component_as::<Database>("database");
    assert_eq!(database.url, "postgres://localhost/compound");
    assert_eq!(database.pool_size, 8);
    assert!(database.connected);

    let greeter = host.component_as::<Greeter>("greeter");
    assert_eq!(greeter.message, "§aWelcome, §eadventurer§a!");
    assert!((greeter.repeat_every - 300.0).abs() < f64::EPSILON);

    let theme = host.component_as::<Theme>("theme");
    assert_eq!(
        theme.primary,
        Color {
            r: 0x33,
            g: 0x66,
            b: 0xFF
        }
    );
    assert_eq!(
        theme.accent,
        Color {
            r: 0xFF,
            g: 0xFF,
            b: 0xFF
        }
    );
}

#[test]
fn bad_database_url_blocks_the_greeter() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("database.json"),
        r#"{ "connection": { "url": "localhost" } }"#,
    )
    .unwrap();
    let host = enabled_host(dir.path());

    let registry = host.registry().unwrap();
    assert_eq!(registry.state("database"), Some(ComponentState::Failed));
    assert_eq!(
        registry.record("greeter").unwrap().fail_reasons().collect::<Vec<_>>(),
        ["blocked by failed dependency 'database'"]
    );
    assert_eq!(registry.state("theme"), Some(ComponentState::Loaded));
}

#[test]
fn invalid_theme_color_fails_only_the_theme() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("theme.json"), r#"{ "primary": "blue" }"#).unwrap();
    let host = enabled_host(dir.path());

    let registry = host.registry().unwrap();
    let theme = registry.record("theme").unwrap();
    assert_eq!(theme.state(), ComponentState::Failed);
    assert!(matches!(theme.failures()[0], LoadFailure::Binding { .. }));
    assert_eq!(registry.state("greeter"), Some(ComponentState::Loaded));
}

#[test]
fn disable_unloads_components_with_hooks() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = enabled_host(dir.path());

    let teardown = host.disable();

    assert_eq!(teardown.unloaded, ["database"]);
    assert!(teardown.failed.is_empty());
}

#[test]
fn sample_config_keeps_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("theme.json"), r##"{ "primary": "#000000" }"##).unwrap();

    write_sample_config(dir.path()).unwrap();

    let theme = fs::read_to_string(dir.path().join("theme.json")).unwrap();
    assert!(theme.contains("#000000"));
    assert!(dir.path().join("database.json").is_file());
}
