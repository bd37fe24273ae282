//! Probe components shared by the `compound_system` integration tests.
#![allow(
    dead_code,
    missing_docs,
    reason = "shared across test binaries; not every binary uses every helper"
)]

use compound_config::prelude::*;
use compound_system::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Calls made on probes, in order: `new:<name>`, `load:<name>`, `unload:<name>`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().clone()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Behavior {
    #[default]
    Succeed,
    FailLoad,
    PanicLoad,
    FailUnload,
    PanicUnload,
}

/// A component that records its lifecycle calls.
#[derive(Configurable)]
pub struct Probe {
    pub name: String,
    pub log: CallLog,
    pub behavior: Behavior,
    #[config(required = false)]
    pub port: i64,
}

impl Lifecycle for Probe {
    fn load(&mut self) -> Result<(), ComponentError> {
        self.log.lock().push(format!("load:{}", self.name));
        match self.behavior {
            Behavior::FailLoad => Err("refused to load".into()),
            Behavior::PanicLoad => panic!("load exploded"),
            _ => Ok(()),
        }
    }

    fn unload(&mut self) -> Result<(), ComponentError> {
        self.log.lock().push(format!("unload:{}", self.name));
        match self.behavior {
            Behavior::FailUnload => Err("refused to unload".into()),
            Behavior::PanicUnload => panic!("unload exploded"),
            _ => Ok(()),
        }
    }
}

impl Component for Probe {
    fn lifecycle(&mut self) -> Option<&mut dyn Lifecycle> {
        Some(self)
    }
}

pub fn probe(name: &str, log: &CallLog) -> ComponentDescriptor {
    probe_with(name, log, Behavior::Succeed)
}

pub fn probe_with(name: &str, log: &CallLog, behavior: Behavior) -> ComponentDescriptor {
    let log = Arc::clone(log);
    let owned = name.to_owned();
    ComponentDescriptor::new(name, move || {
        log.lock().push(format!("new:{owned}"));
        Ok(Probe {
            name: owned,
            log,
            behavior,
            port: 0,
        })
    })
}

/// A component with a required key and no hooks.
#[derive(Debug, Default, Configurable)]
pub struct NeedsPort {
    #[config(key = "server.port")]
    pub port: u16,
}

impl Component for NeedsPort {}

/// A component with nothing to configure.
#[derive(Debug, Default, Configurable)]
pub struct Plain;

impl Component for Plain {}

pub fn run(catalog: Catalog) -> (ComponentRegistry, LoadReport) {
    run_with(MemoryStore::new(), catalog)
}

pub fn run_with(store: MemoryStore, catalog: Catalog) -> (ComponentRegistry, LoadReport) {
    let binder = Binder::new(store);
    LoadScheduler::new(&binder).run(catalog)
}

pub fn reasons(registry: &ComponentRegistry, name: &str) -> Vec<String> {
    registry
        .record(name)
        .map(|record| record.fail_reasons().collect())
        .unwrap_or_default()
}
