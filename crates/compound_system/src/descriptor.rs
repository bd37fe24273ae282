//! Component descriptors: what is known about a component before it exists.

use crate::component::{Component, ComponentError};
use core::fmt;

/// Instantiates a component. Called at most once.
pub type ComponentFactory =
    Box<dyn FnOnce() -> Result<Box<dyn Component>, ComponentError> + Send>;

/// Static metadata for one component: its name, description, dependencies,
/// configuration defaults and the factory that instantiates it.
///
/// The factory is released once the component's load outcome is decided,
/// whether or not it was ever called.
///
/// # Example
///
/// ```
/// use compound_config::prelude::*;
/// use compound_system::component::Component;
/// use compound_system::descriptor::ComponentDescriptor;
///
/// #[derive(Default, Configurable)]
/// struct Chat;
/// impl Component for Chat {}
///
/// let descriptor = ComponentDescriptor::of::<Chat>("chat")
///     .with_description("Chat formatting")
///     .depends_on("database")
///     .depends_on("permissions");
///
/// assert_eq!(descriptor.name(), "chat");
/// assert_eq!(descriptor.dependencies(), ["database", "permissions"]);
/// assert_eq!(descriptor.config_path(), Some("chat.json"));
/// ```
pub struct ComponentDescriptor {
    name: String,
    description: String,
    dependencies: Vec<String>,
    config_path: Option<String>,
    base_key: Option<String>,
    factory: Option<ComponentFactory>,
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("dependencies", &self.dependencies)
            .field("config_path", &self.config_path)
            .field("base_key", &self.base_key)
            .field("released", &self.is_released())
            .finish()
    }
}

impl ComponentDescriptor {
    /// Creates a descriptor whose component is built by `factory`.
    ///
    /// The default configuration document is `<name>.json`.
    #[must_use]
    pub fn new<C, F>(name: impl Into<String>, factory: F) -> Self
    where
        C: Component,
        F: FnOnce() -> Result<C, ComponentError> + Send + 'static,
    {
        let name = name.into();
        Self {
            config_path: Some(format!("{name}.json")),
            name,
            description: String::new(),
            dependencies: Vec::new(),
            base_key: None,
            factory: Some(Box::new(move || {
                factory().map(|component| Box::new(component) as Box<dyn Component>)
            })),
        }
    }

    /// Creates a descriptor whose component is built with [`Default`].
    #[must_use]
    pub fn of<C: Component + Default>(name: impl Into<String>) -> Self {
        Self::new(name, || Ok(C::default()))
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares a dependency on the component named `name`.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Replaces the default configuration document.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Binds the component without a default document; only field- and
    /// type-level paths apply.
    #[must_use]
    pub fn without_config_path(mut self) -> Self {
        self.config_path = None;
        self
    }

    /// Prefixes every configuration key of the component with `base_key`.
    #[must_use]
    pub fn with_base_key(mut self, base_key: impl Into<String>) -> Self {
        self.base_key = Some(base_key.into());
        self
    }

    /// Returns the component's unique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared dependency names in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Returns the default configuration document path.
    #[must_use]
    pub fn config_path(&self) -> Option<&str> {
        self.config_path.as_deref()
    }

    /// Returns the configuration base key.
    #[must_use]
    pub fn base_key(&self) -> Option<&str> {
        self.base_key.as_deref()
    }

    /// Takes the factory, leaving the descriptor released.
    pub fn take_factory(&mut self) -> Option<ComponentFactory> {
        self.factory.take()
    }

    /// Returns true once the factory has been taken.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.factory.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compound_config::schema::{ConfigSchema, Configurable};

    struct Probe(u8);

    impl Configurable for Probe {
        fn schema() -> ConfigSchema<Self> {
            ConfigSchema::new()
        }
    }

    impl Component for Probe {}

    #[test]
    fn factory_runs_once() {
        let mut descriptor = ComponentDescriptor::new("probe", || Ok(Probe(7)));
        assert!(!descriptor.is_released());

        let factory = descriptor.take_factory().unwrap();
        assert!(descriptor.is_released());
        assert!(descriptor.take_factory().is_none());

        let component = factory().unwrap();
        assert_eq!(component.downcast_ref::<Probe>().map(|p| p.0), Some(7));
    }

    #[test]
    fn factory_errors_surface() {
        let mut descriptor = ComponentDescriptor::new("probe", || -> Result<Probe, _> {
            Err("no backend".into())
        });

        let err = (descriptor.take_factory().unwrap())().err().unwrap();
        assert_eq!(err.to_string(), "no backend");
    }

    #[test]
    fn config_defaults_follow_name() {
        let descriptor = ComponentDescriptor::new("probe", || Ok(Probe(0)));
        assert_eq!(descriptor.config_path(), Some("probe.json"));
        assert_eq!(descriptor.base_key(), None);

        let descriptor = descriptor.with_config_path("shared.json").with_base_key("probe");
        assert_eq!(descriptor.config_path(), Some("shared.json"));
        assert_eq!(descriptor.base_key(), Some("probe"));

        assert_eq!(descriptor.without_config_path().config_path(), None);
    }

    #[test]
    fn dependencies_keep_declaration_order() {
        let descriptor = ComponentDescriptor::new("probe", || Ok(Probe(0)))
            .depends_on("b")
            .depends_on("a");
        assert_eq!(descriptor.dependencies(), ["b", "a"]);
    }
}
