//! Compound demo host.
//!
//! Loads the demo components against a data folder, reports what loaded,
//! then unloads everything.
//!
//! # Usage
//!
//! ```bash
//! compound-demo [data_folder]
//! ```
//!
//! The data folder defaults to `COMPOUND_DATA_DIR`, then `./data`. Sample
//! configuration files are written into it if missing.

use compound_core::HostSettings;
use compound_system::prelude::*;
use example::{DemoComponents, Greeter, Theme, write_sample_config};
use std::path::PathBuf;

fn main() {
    let _ = dotenvy::dotenv();

    let mut settings = HostSettings::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    if let Some(folder) = std::env::args().nth(1) {
        settings.data_folder = PathBuf::from(folder);
    }
    settings.tracing().init();

    if let Err(e) = write_sample_config(&settings.data_folder) {
        eprintln!(
            "Error: cannot write sample config to {}: {e}",
            settings.data_folder.display()
        );
        std::process::exit(1);
    }

    let mut host = settings.build_host();
    let report = match host.enable(DemoComponents) {
        Ok(report) => report.clone(),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        loaded = ?report.loaded,
        failed = ?report.failed,
        passes = report.passes,
        "components enabled"
    );

    if let Some(registry) = host.registry() {
        for record in registry.records() {
            for reason in record.fail_reasons() {
                tracing::warn!(component = record.name(), %reason, "component unavailable");
            }
        }
        if let Some(greeter) = registry.try_get("greeter").and_then(|c| c.downcast_ref::<Greeter>()) {
            tracing::info!(message = %greeter.message, "greeter ready");
        }
        if let Some(theme) = registry.try_get("theme").and_then(|c| c.downcast_ref::<Theme>()) {
            tracing::info!(primary = ?theme.primary, accent = ?theme.accent, "theme ready");
        }
    }

    let teardown = host.disable();
    tracing::info!(unloaded = ?teardown.unloaded, failed = ?teardown.failed, "components disabled");
}
