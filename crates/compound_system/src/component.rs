//! The component trait and its optional lifecycle hooks.

use compound_config::schema::Bind;
use downcast_rs::{Downcast, impl_downcast};

/// Error type returned by component factories and lifecycle hooks.
pub type ComponentError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A unit of functionality loaded by the scheduler.
///
/// Every component is configurable: the scheduler binds configuration into
/// it before calling its load hook. A component with nothing to configure
/// implements [`Configurable`](compound_config::schema::Configurable) with an
/// empty schema, or derives it without `#[config]` fields.
///
/// # Example
///
/// ```
/// use compound_config::prelude::*;
/// use compound_system::component::{Component, ComponentError, Lifecycle};
///
/// #[derive(Default, Configurable)]
/// struct Metrics {
///     #[config(required = false)]
///     interval_secs: u64,
///     running: bool,
/// }
///
/// impl Lifecycle for Metrics {
///     fn load(&mut self) -> Result<(), ComponentError> {
///         self.running = true;
///         Ok(())
///     }
/// }
///
/// impl Component for Metrics {
///     fn lifecycle(&mut self) -> Option<&mut dyn Lifecycle> {
///         Some(self)
///     }
/// }
/// ```
pub trait Component: Bind + Downcast {
    /// Returns the component's load and unload hooks, if it has any.
    ///
    /// Components without hooks are bound and registered, nothing more.
    fn lifecycle(&mut self) -> Option<&mut dyn Lifecycle> {
        None
    }
}

impl_downcast!(Component);

/// Load and unload hooks of a component.
pub trait Lifecycle {
    /// Called once, after configuration has been bound.
    ///
    /// # Errors
    ///
    /// An error marks the component failed.
    fn load(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called once during teardown, dependents before their dependencies.
    ///
    /// # Errors
    ///
    /// An error is recorded on the component's record; teardown continues.
    fn unload(&mut self) -> Result<(), ComponentError> {
        Ok(())
    }
}
