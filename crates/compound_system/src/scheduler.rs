//! The load scheduler.
//!
//! Loads every catalogued component in dependency order, in passes:
//!
//! - A component whose dependency failed fails too, without an attempt.
//! - A component waiting on a pending dependency is deferred to a later pass.
//! - A component whose dependencies have all loaded is attempted: it is
//!   instantiated, configured, then its load hook runs.
//!
//! A pass in which no component changes state ends the run. The components
//! still pending at that point wait on each other in a cycle; they are
//! reported as deadlocked and left pending.
//!
//! Everything runs on the caller's thread. Errors and panics inside one
//! attempt fail that component only.

use crate::catalog::Catalog;
use crate::component::Component;
use crate::descriptor::ComponentDescriptor;
use crate::error::LoadFailure;
use crate::graph::{DependencyGraph, MissingDependency};
use crate::record::ComponentState;
use crate::registry::ComponentRegistry;
use compound_config::binder::Binder;
use compound_config::error::panic_message;
use hashbrown::HashMap;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

/// Outcome summary of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Loaded components, in load order.
    pub loaded: Vec<String>,
    /// Failed components, in catalog order.
    pub failed: Vec<String>,
    /// Components left pending by a dependency cycle, in catalog order.
    pub deadlocked: Vec<String>,
    /// Number of passes run.
    pub passes: usize,
}

impl LoadReport {
    /// Returns true if every component reached a terminal state.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.deadlocked.is_empty()
    }
}

/// Drives a catalog to terminal states.
///
/// # Example
///
/// ```
/// use compound_config::prelude::*;
/// use compound_system::prelude::*;
///
/// #[derive(Default, Configurable)]
/// struct Noop;
/// impl Component for Noop {}
///
/// let catalog = Catalog::new()
///     .with(ComponentDescriptor::of::<Noop>("chat").depends_on("database"))
///     .with(ComponentDescriptor::of::<Noop>("database"));
///
/// let binder = Binder::new(MemoryStore::new());
/// let (registry, report) = LoadScheduler::new(&binder).run(catalog);
///
/// assert_eq!(report.loaded, ["database", "chat"]);
/// assert_eq!(registry.state("chat"), Some(ComponentState::Loaded));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoadScheduler<'a> {
    binder: &'a Binder,
}

/// A failed attempt.
struct Failed {
    failure: LoadFailure,
    trace: Option<String>,
    instance: Option<Box<dyn Component>>,
}

impl Failed {
    fn new(failure: LoadFailure) -> Self {
        Self {
            failure,
            trace: None,
            instance: None,
        }
    }
}

/// How far an attempt got before it panicked.
#[derive(Clone, Copy)]
enum Phase {
    Instantiate,
    Bind,
    Hook,
}

enum Readiness {
    Ready,
    Waiting,
    Blocked(String),
}

impl<'a> LoadScheduler<'a> {
    /// Creates a scheduler that configures components with `binder`.
    #[must_use]
    pub fn new(binder: &'a Binder) -> Self {
        Self { binder }
    }

    /// Loads every component in `catalog`.
    ///
    /// Returns the registry holding every record, and a summary.
    pub fn run(&self, catalog: Catalog) -> (ComponentRegistry, LoadReport) {
        let (mut graph, missing) = DependencyGraph::build(catalog.iter());
        let mut registry = ComponentRegistry::new(catalog.iter());
        let mut descriptors: HashMap<String, ComponentDescriptor> = catalog
            .into_descriptors()
            .into_iter()
            .map(|descriptor| (descriptor.name().to_owned(), descriptor))
            .collect();

        for MissingDependency {
            component,
            dependency,
        } in missing
        {
            tracing::error!(
                component = %component,
                dependency = %dependency,
                "component has a missing dependency"
            );
            descriptors.remove(&component);
            registry.mark_failed(
                &component,
                LoadFailure::MissingDependency { dependency },
                None,
                None,
            );
        }

        let mut report = LoadReport::default();
        loop {
            let pending: Vec<String> = registry.pending().map(str::to_owned).collect();
            if pending.is_empty() {
                break;
            }
            report.passes += 1;

            let mut progressed = false;
            for name in &pending {
                match Self::readiness(&graph, &registry, name) {
                    Readiness::Waiting => continue,
                    Readiness::Blocked(dependency) => {
                        tracing::error!(
                            component = %name,
                            dependency = %dependency,
                            "component failed to load because a dependency failed"
                        );
                        descriptors.remove(name);
                        registry.mark_failed(
                            name,
                            LoadFailure::DependencyFailed { dependency },
                            None,
                            None,
                        );
                    }
                    Readiness::Ready => {
                        let outcome = match descriptors.remove(name) {
                            Some(descriptor) => self.attempt(descriptor),
                            None => Err(Failed::new(LoadFailure::Unexpected {
                                message: "component factory already released".to_owned(),
                            })),
                        };
                        match outcome {
                            Ok(instance) => {
                                tracing::info!(component = %name, "component loaded");
                                registry.mark_loaded(name, instance);
                                graph.clear_dependents_of(name);
                            }
                            Err(failed) => {
                                tracing::error!(
                                    component = %name,
                                    reason = %failed.failure,
                                    "component failed to load"
                                );
                                registry.mark_failed(
                                    name,
                                    failed.failure,
                                    failed.instance,
                                    failed.trace,
                                );
                            }
                        }
                    }
                }
                progressed = true;
            }

            if !progressed {
                tracing::error!(
                    components = ?pending,
                    "component loading deadlocked, these components wait on each other"
                );
                report.deadlocked = pending;
                break;
            }
        }

        report.loaded = registry.load_order().to_vec();
        report.failed = registry.failed().map(str::to_owned).collect();
        (registry, report)
    }

    /// Failed dependencies take precedence over pending ones.
    fn readiness(graph: &DependencyGraph, registry: &ComponentRegistry, name: &str) -> Readiness {
        let dependencies = graph.dependencies_of(name);

        if let Some(failed) = dependencies
            .iter()
            .find(|dependency| registry.state(dependency) == Some(ComponentState::Failed))
        {
            return Readiness::Blocked((*failed).to_owned());
        }

        if dependencies
            .iter()
            .any(|dependency| registry.state(dependency) != Some(ComponentState::Loaded))
        {
            return Readiness::Waiting;
        }

        Readiness::Ready
    }

    /// Instantiates, configures and loads one component.
    fn attempt(&self, mut descriptor: ComponentDescriptor) -> Result<Box<dyn Component>, Failed> {
        let Some(factory) = descriptor.take_factory() else {
            return Err(Failed::new(LoadFailure::Unexpected {
                message: "component factory already released".to_owned(),
            }));
        };

        let mut phase = Phase::Instantiate;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut component = factory().map_err(|err| Failed {
                failure: LoadFailure::Unexpected {
                    message: format!("failed to instantiate: {err}"),
                },
                trace: Some(format!("{err:?}")),
                instance: None,
            })?;

            phase = Phase::Bind;
            if let Err(source) = self.binder.bind_dyn(
                &mut *component,
                descriptor.config_path(),
                descriptor.base_key(),
            ) {
                return Err(Failed {
                    trace: source.trace(),
                    failure: LoadFailure::Binding { source },
                    instance: Some(component),
                });
            }

            phase = Phase::Hook;
            let loaded = match component.lifecycle() {
                Some(hooks) => hooks.load(),
                None => Ok(()),
            };
            if let Err(err) = loaded {
                return Err(Failed {
                    failure: LoadFailure::Hook {
                        reason: err.to_string(),
                    },
                    trace: Some(format!("{err:?}")),
                    instance: Some(component),
                });
            }

            Ok(component)
        }));

        outcome.unwrap_or_else(|payload| {
            let message = panic_message(&*payload);
            let failure = match phase {
                Phase::Instantiate => LoadFailure::Unexpected {
                    message: format!("panicked while instantiating: {message}"),
                },
                Phase::Bind => LoadFailure::Unexpected {
                    message: format!("panicked while binding config: {message}"),
                },
                Phase::Hook => LoadFailure::Hook {
                    reason: format!("panicked: {message}"),
                },
            };
            Err(Failed {
                failure,
                trace: Some(Backtrace::force_capture().to_string()),
                instance: None,
            })
        })
    }
}
