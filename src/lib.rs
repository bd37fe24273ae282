//! A component framework that loads self-contained units in dependency order
//! and binds external configuration into their fields.
//!

/// Configuration documents, stores and the field binder.
pub use compound_config;

/// Component descriptors, dependency graph, load scheduler and registry.
pub use compound_system;

/// Host infrastructure: tracing setup and host settings.
pub use compound_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use compound_config::prelude::*;
    pub use compound_core::{HostSettings, TracingFormat, TracingSetup};
    pub use compound_system::prelude::*;
}
