//! The runtime table of component records.

use crate::component::Component;
use crate::descriptor::ComponentDescriptor;
use crate::error::LoadFailure;
use crate::record::{ComponentRecord, ComponentState};
use compound_config::error::panic_message;
use indexmap::IndexMap;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

/// Outcome of [`ComponentRegistry::teardown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Components whose unload hook succeeded, in unload order.
    pub unloaded: Vec<String>,
    /// Components whose unload hook failed or panicked, in unload order.
    pub failed: Vec<String>,
}

/// Every component's record, in catalog order, plus the order in which
/// components loaded.
///
/// Lookups by name are for loaded components only. Looking up an unknown or
/// unloaded component is a usage error and panics; check
/// [`state`](Self::state) first, or use [`try_get`](Self::try_get).
pub struct ComponentRegistry {
    records: IndexMap<String, ComponentRecord>,
    load_order: Vec<String>,
    torn_down: bool,
}

impl core::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("records", &self.records.values().collect::<Vec<_>>())
            .field("load_order", &self.load_order)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

#[cold]
#[track_caller]
fn lookup_failed(name: &str, state: Option<ComponentState>) -> ! {
    match state {
        None => panic!("Component '{name}' is not registered."),
        Some(state) => panic!(
            "Component '{name}' is {state}, not loaded.\n\
             Check the component's state before looking it up."
        ),
    }
}

impl ComponentRegistry {
    /// Creates a registry with one pending record per descriptor.
    pub(crate) fn new<'a>(descriptors: impl IntoIterator<Item = &'a ComponentDescriptor>) -> Self {
        let records = descriptors
            .into_iter()
            .map(|descriptor| {
                (
                    descriptor.name().to_owned(),
                    ComponentRecord::new(descriptor.name(), descriptor.description()),
                )
            })
            .collect();
        Self {
            records,
            load_order: Vec::new(),
            torn_down: false,
        }
    }

    pub(crate) fn mark_loaded(&mut self, name: &str, instance: Box<dyn Component>) {
        if let Some(record) = self.records.get_mut(name) {
            record.mark_loaded(instance);
            self.load_order.push(name.to_owned());
        }
    }

    pub(crate) fn mark_failed(
        &mut self,
        name: &str,
        failure: LoadFailure,
        instance: Option<Box<dyn Component>>,
        trace: Option<String>,
    ) {
        if let Some(record) = self.records.get_mut(name) {
            record.mark_failed(failure, instance, trace);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the loaded component named `name`.
    ///
    /// # Panics
    ///
    /// If `name` is unknown or not loaded.
    #[must_use]
    #[track_caller]
    pub fn get(&self, name: &str) -> &dyn Component {
        match self.try_get(name) {
            Some(component) => component,
            None => lookup_failed(name, self.state(name)),
        }
    }

    /// Returns the loaded component named `name`, mutably.
    ///
    /// # Panics
    ///
    /// If `name` is unknown or not loaded.
    #[must_use]
    #[track_caller]
    pub fn get_mut(&mut self, name: &str) -> &mut dyn Component {
        let state = self.state(name);
        match self
            .records
            .get_mut(name)
            .and_then(ComponentRecord::loaded_instance_mut)
        {
            Some(component) => component,
            None => lookup_failed(name, state),
        }
    }

    /// Returns the loaded component named `name` as a `T`.
    ///
    /// # Panics
    ///
    /// If `name` is unknown, not loaded, or not a `T`.
    #[must_use]
    #[track_caller]
    pub fn get_as<T: Component>(&self, name: &str) -> &T {
        match self.get(name).downcast_ref::<T>() {
            Some(component) => component,
            None => panic!(
                "Component '{name}' is not a '{}'.",
                core::any::type_name::<T>()
            ),
        }
    }

    /// Returns the loaded component named `name` as a mutable `T`.
    ///
    /// # Panics
    ///
    /// If `name` is unknown, not loaded, or not a `T`.
    #[must_use]
    #[track_caller]
    pub fn get_as_mut<T: Component>(&mut self, name: &str) -> &mut T {
        match self.get_mut(name).downcast_mut::<T>() {
            Some(component) => component,
            None => panic!(
                "Component '{name}' is not a '{}'.",
                core::any::type_name::<T>()
            ),
        }
    }

    /// Returns the loaded component named `name`, or `None`.
    #[must_use]
    pub fn try_get(&self, name: &str) -> Option<&dyn Component> {
        self.records
            .get(name)
            .and_then(ComponentRecord::loaded_instance)
    }

    /// Returns the state of `name`, or `None` if it is unknown.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<ComponentState> {
        self.records.get(name).map(ComponentRecord::state)
    }

    /// Returns the record of `name`.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&ComponentRecord> {
        self.records.get(name)
    }

    /// Returns every record in catalog order.
    pub fn records(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.records.values()
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns loaded component names in catalog order.
    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.in_state(ComponentState::Loaded)
    }

    /// Returns failed component names in catalog order.
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.in_state(ComponentState::Failed)
    }

    /// Returns pending component names in catalog order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.in_state(ComponentState::Pending)
    }

    /// Returns loaded component names in the order they loaded.
    #[must_use]
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    fn in_state(&self, state: ComponentState) -> impl Iterator<Item = &str> {
        self.records
            .values()
            .filter(move |record| record.state() == state)
            .map(ComponentRecord::name)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Teardown
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns true once [`teardown`](Self::teardown) has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Unloads loaded components in reverse load order.
    ///
    /// An unload error or panic is logged and recorded on the component's
    /// record, and teardown moves on to the next component. States are
    /// left as they are.
    ///
    /// # Panics
    ///
    /// If called more than once.
    pub fn teardown(&mut self) -> TeardownReport {
        if self.torn_down {
            panic!("ComponentRegistry::teardown() was already called. Cannot tear down twice.");
        }
        self.torn_down = true;

        let mut report = TeardownReport::default();
        for name in self.load_order.iter().rev() {
            let Some(record) = self.records.get_mut(name) else {
                continue;
            };
            let Some(hooks) = record
                .loaded_instance_mut()
                .and_then(|component| component.lifecycle())
            else {
                continue;
            };

            tracing::info!(component = %name, "unloading component");
            let (failure, trace) = match panic::catch_unwind(AssertUnwindSafe(|| hooks.unload())) {
                Ok(Ok(())) => {
                    report.unloaded.push(name.clone());
                    continue;
                }
                Ok(Err(err)) => (
                    LoadFailure::Unload {
                        reason: err.to_string(),
                    },
                    format!("{err:?}"),
                ),
                Err(payload) => (
                    LoadFailure::Unload {
                        reason: format!("panicked: {}", panic_message(&*payload)),
                    },
                    Backtrace::force_capture().to_string(),
                ),
            };

            tracing::error!(component = %name, reason = %failure, "error when unloading component");
            record.record_failure(failure, Some(trace));
            report.failed.push(name.clone());
        }
        report
    }
}
