//! Dependency-ordered component loading for Compound.
//!
//! `compound_system` loads self-contained components once every component
//! they depend on has loaded, and configures each one on the way:
//!
//! - [`component`] - The component trait and its optional lifecycle hooks
//! - [`descriptor`] - Discovery-time metadata and the one-shot factory
//! - [`catalog`] - Discovery intake and component groups
//! - [`graph`] - Dependency validation and edge bookkeeping
//! - [`scheduler`] - The pass-based load scheduler
//! - [`registry`] - Per-component records, lookup and teardown
//! - [`host`] - Folder setup and the enable/disable lifecycle
//!
//! A failing component never takes the others down: it is marked failed,
//! the components depending on it fail with it, and everything else loads.
//!
//! # Example
//!
//! ```
//! use compound_config::prelude::*;
//! use compound_system::prelude::*;
//!
//! #[derive(Default, Configurable)]
//! struct Database {
//!     #[config(key = "connection.url")]
//!     url: String,
//! }
//! impl Component for Database {}
//!
//! #[derive(Default, Configurable)]
//! struct Chat;
//! impl Component for Chat {}
//!
//! let store = MemoryStore::new().with_document(
//!     "database.json",
//!     ConfigDocument::new().with("connection.url", "postgres://localhost"),
//! );
//! let binder = Binder::new(store);
//!
//! let catalog = Catalog::new()
//!     .with(ComponentDescriptor::of::<Chat>("chat").depends_on("database"))
//!     .with(ComponentDescriptor::of::<Database>("database"))
//!     .with(ComponentDescriptor::of::<Chat>("broken").depends_on("missing"));
//!
//! let (registry, report) = LoadScheduler::new(&binder).run(catalog);
//! assert_eq!(report.loaded, ["database", "chat"]);
//! assert_eq!(report.failed, ["broken"]);
//! assert_eq!(registry.get_as::<Database>("database").url, "postgres://localhost");
//! ```

/// Discovery intake and component groups.
pub mod catalog;

/// The component trait and lifecycle hooks.
pub mod component;

/// Component descriptors.
pub mod descriptor;

/// Load and setup error types.
pub mod error;

/// The dependency graph.
pub mod graph;

/// The component host.
pub mod host;

/// Per-component runtime records.
pub mod record;

/// The component registry.
pub mod registry;

/// The load scheduler.
pub mod scheduler;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::component::*;
    pub use crate::descriptor::*;
    pub use crate::error::*;
    pub use crate::graph::*;
    pub use crate::host::*;
    pub use crate::record::*;
    pub use crate::registry::*;
    pub use crate::scheduler::*;
}
