//! The component host: folder setup, discovery, loading and teardown.

use crate::catalog::{Catalog, Discovery};
use crate::component::Component;
use crate::error::SetupError;
use crate::registry::{ComponentRegistry, TeardownReport};
use crate::scheduler::{LoadReport, LoadScheduler};
use compound_config::binder::Binder;
use compound_config::error::BindError;
use compound_config::schema::Configurable;
use compound_config::store::{ConfigStore, DirectoryStore};
use std::path::{Path, PathBuf};

/// Name of the folder created under the data folder for component files.
pub const DEFAULT_COMPONENTS_FOLDER: &str = "components";

/// Represents the lifecycle state of the host.
///
/// The host progresses through these states linearly:
/// `NotStarted` → `Enabled` → `Disabled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostState {
    /// [`enable`](ComponentHost::enable) has not been called yet.
    #[default]
    NotStarted,
    /// Components have been loaded and the registry is available.
    Enabled,
    /// Components have been unloaded, or setup failed.
    Disabled,
}

/// Owns the binder, the registry and the lifecycle around them.
///
/// # Example
///
/// ```
/// use compound_config::prelude::*;
/// use compound_system::prelude::*;
///
/// #[derive(Default, Configurable)]
/// struct Greeter {
///     #[config]
///     message: String,
/// }
/// impl Component for Greeter {}
///
/// let data = std::env::temp_dir().join("compound-host-doc");
/// let store = MemoryStore::new().with_document(
///     "greeter.json",
///     ConfigDocument::new().with("message", "hello"),
/// );
///
/// let mut host = ComponentHost::new(&data, store);
/// let report = host
///     .enable(vec![ComponentDescriptor::of::<Greeter>("greeter")])
///     .unwrap();
/// assert_eq!(report.loaded, ["greeter"]);
/// assert_eq!(host.component_as::<Greeter>("greeter").message, "hello");
///
/// host.disable();
/// ```
pub struct ComponentHost {
    data_folder: PathBuf,
    components_folder: String,
    binder: Binder,
    state: HostState,
    registry: Option<ComponentRegistry>,
    report: Option<LoadReport>,
}

impl core::fmt::Debug for ComponentHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentHost")
            .field("data_folder", &self.data_folder)
            .field("components_folder", &self.components_folder)
            .field("state", &self.state)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl ComponentHost {
    /// Creates a host reading configuration from `store`.
    #[must_use]
    pub fn new(data_folder: impl Into<PathBuf>, store: impl ConfigStore + 'static) -> Self {
        Self::with_binder(data_folder, Binder::new(store))
    }

    /// Creates a host that configures components with `binder`.
    #[must_use]
    pub fn with_binder(data_folder: impl Into<PathBuf>, binder: Binder) -> Self {
        Self {
            data_folder: data_folder.into(),
            components_folder: DEFAULT_COMPONENTS_FOLDER.to_owned(),
            binder,
            state: HostState::NotStarted,
            registry: None,
            report: None,
        }
    }

    /// Creates a host whose configuration paths are files relative to
    /// `data_folder`.
    #[must_use]
    pub fn open(data_folder: impl Into<PathBuf>) -> Self {
        let data_folder = data_folder.into();
        let store = DirectoryStore::new(data_folder.clone());
        Self::new(data_folder, store)
    }

    /// Renames the components folder created under the data folder.
    #[must_use]
    pub fn with_components_folder(mut self, name: impl Into<String>) -> Self {
        self.components_folder = name.into();
        self
    }

    /// Returns the data folder.
    #[must_use]
    pub fn data_folder(&self) -> &Path {
        &self.data_folder
    }

    /// Returns the folder component files are kept in.
    #[must_use]
    pub fn components_folder(&self) -> PathBuf {
        self.data_folder.join(&self.components_folder)
    }

    /// Returns the binder used to configure components.
    #[must_use]
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HostState {
        self.state
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Discovers and loads components.
    ///
    /// Ensures the components folder exists, collects descriptors from
    /// `discovery`, and loads them in dependency order. Component failures
    /// are recorded in the registry; they never fail this call.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if the components folder cannot be created or
    /// discovery fails. The host is then disabled and nothing is loaded.
    ///
    /// # Panics
    ///
    /// If called more than once.
    pub fn enable(&mut self, discovery: impl Discovery) -> Result<&LoadReport, SetupError> {
        if self.state != HostState::NotStarted {
            panic!("ComponentHost::enable() was already called. Cannot enable twice.");
        }

        let catalog = match self.prepare(discovery) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "component host setup failed");
                self.state = HostState::Disabled;
                return Err(err);
            }
        };

        let names: Vec<&str> = catalog.names().collect();
        tracing::info!("Found components: [{}]", names.join(", "));

        let (registry, report) = LoadScheduler::new(&self.binder).run(catalog);
        self.registry = Some(registry);
        self.state = HostState::Enabled;
        Ok(self.report.insert(report))
    }

    fn prepare(&self, discovery: impl Discovery) -> Result<Catalog, SetupError> {
        let folder = self.components_folder();
        std::fs::create_dir_all(&folder).map_err(|source| SetupError::ComponentFolder {
            path: folder.clone(),
            source,
        })?;
        Catalog::from_discovery(discovery).map_err(|source| SetupError::Discovery { source })
    }

    /// Unloads every loaded component and drops the registry.
    ///
    /// # Panics
    ///
    /// If the host is not enabled.
    pub fn disable(&mut self) -> TeardownReport {
        if self.state != HostState::Enabled {
            panic!(
                "ComponentHost::disable() called while {:?}.\n\
                 Call enable() first, and disable() only once.",
                self.state
            );
        }
        self.state = HostState::Disabled;

        match self.registry.take() {
            Some(mut registry) => registry.teardown(),
            None => TeardownReport::default(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the registry while the host is enabled.
    #[must_use]
    pub fn registry(&self) -> Option<&ComponentRegistry> {
        self.registry.as_ref()
    }

    /// Returns the registry mutably while the host is enabled.
    #[must_use]
    pub fn registry_mut(&mut self) -> Option<&mut ComponentRegistry> {
        self.registry.as_mut()
    }

    /// Returns the report of the load run.
    #[must_use]
    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    /// Returns the loaded component named `name`.
    ///
    /// # Panics
    ///
    /// If the host is not enabled, or `name` is unknown or not loaded.
    #[must_use]
    #[track_caller]
    pub fn component(&self, name: &str) -> &dyn Component {
        self.enabled_registry().get(name)
    }

    /// Returns the loaded component named `name` as a `T`.
    ///
    /// # Panics
    ///
    /// If the host is not enabled, or `name` is unknown, not loaded, or not a `T`.
    #[must_use]
    #[track_caller]
    pub fn component_as<T: Component>(&self, name: &str) -> &T {
        self.enabled_registry().get_as(name)
    }

    #[track_caller]
    fn enabled_registry(&self) -> &ComponentRegistry {
        match &self.registry {
            Some(registry) => registry,
            None => panic!(
                "ComponentHost is {:?}; components are only available while enabled.",
                self.state
            ),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Binds configuration into a host-side object using its own paths.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    pub fn inject_config<T: Configurable>(&self, target: &mut T) -> Result<(), BindError> {
        self.binder.bind(target)
    }

    /// Binds configuration into a host-side object, with `path` as the
    /// default document and keys prefixed by `base_key`.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    pub fn inject_config_with_path<T: Configurable>(
        &self,
        target: &mut T,
        path: &str,
        base_key: Option<&str>,
    ) -> Result<(), BindError> {
        self.binder.bind_with_path(target, path, base_key)
    }
}
