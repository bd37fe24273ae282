//! Host infrastructure for Compound.
//!
//! - [`tracing_setup`] - Installs the `tracing` subscriber
//! - [`settings`] - Host settings from JSON and the environment
//!
//! # Example
//!
//! ```no_run
//! use compound_core::HostSettings;
//!
//! let settings = HostSettings::from_env().unwrap();
//! settings.tracing().init();
//! let mut host = settings.build_host();
//! # let _ = &mut host;
//! ```

/// Host settings.
pub mod settings;

/// Tracing subscriber installation.
pub mod tracing_setup;

pub use settings::{HostSettings, SettingsError};
pub use tracing_setup::{ParseFormatError, TracingFormat, TracingSetup};
