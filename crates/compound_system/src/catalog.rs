//! Discovery intake: the ordered set of descriptors handed to the scheduler.
//!
//! Discovery itself (scanning, registration macros, manifests) is up to the
//! embedder. Whatever it produces goes through [`Discovery`] into a
//! [`Catalog`], which keeps discovery order and one descriptor per name.

use crate::component::ComponentError;
use crate::descriptor::ComponentDescriptor;
use indexmap::IndexMap;

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// A source of component descriptors.
///
/// Consumed on use, since descriptors own one-shot factories.
pub trait Discovery {
    /// Produces the discovered descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery itself failed.
    fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError>;
}

impl Discovery for Vec<ComponentDescriptor> {
    fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
        Ok(self)
    }
}

impl Discovery for Catalog {
    fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
        Ok(self.into_descriptors())
    }
}

impl<G: ComponentGroup> Discovery for G {
    fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
        self.build().discover()
    }
}

impl Discovery for ComponentGroupBuilder {
    fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
        Ok(self.descriptors)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Descriptors keyed by name, in discovery order.
///
/// Registering a name twice keeps the later descriptor at the earlier
/// position.
///
/// # Example
///
/// ```
/// use compound_config::prelude::*;
/// use compound_system::catalog::Catalog;
/// use compound_system::component::Component;
/// use compound_system::descriptor::ComponentDescriptor;
///
/// #[derive(Default, Configurable)]
/// struct Noop;
/// impl Component for Noop {}
///
/// let catalog = Catalog::new()
///     .with(ComponentDescriptor::of::<Noop>("database"))
///     .with(ComponentDescriptor::of::<Noop>("chat").depends_on("database"));
///
/// assert_eq!(catalog.names().collect::<Vec<_>>(), ["database", "chat"]);
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    descriptors: IndexMap<String, ComponentDescriptor>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects everything `discovery` produces.
    ///
    /// # Errors
    ///
    /// Returns the discovery error.
    pub fn from_discovery(discovery: impl Discovery) -> Result<Self, ComponentError> {
        let mut catalog = Self::new();
        for descriptor in discovery.discover()? {
            catalog.add(descriptor);
        }
        Ok(catalog)
    }

    /// Adds a descriptor, replacing any with the same name.
    pub fn add(&mut self, descriptor: ComponentDescriptor) -> &mut Self {
        let name = descriptor.name().to_owned();
        if self.descriptors.insert(name.clone(), descriptor).is_some() {
            tracing::warn!(component = %name, "component registered twice, keeping the last");
        }
        self
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, descriptor: ComponentDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    /// Returns the descriptor named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.get(name)
    }

    /// Returns true if a descriptor is named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Returns the names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// Returns the descriptors in discovery order.
    pub fn iter(&self) -> indexmap::map::Values<'_, String, ComponentDescriptor> {
        self.descriptors.values()
    }

    /// Returns the number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Consumes the catalog, returning descriptors in discovery order.
    #[must_use]
    pub fn into_descriptors(self) -> Vec<ComponentDescriptor> {
        self.descriptors.into_values().collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ComponentGroup
// ─────────────────────────────────────────────────────────────────────────────

/// A bundle of components registered together.
///
/// # Example
///
/// ```ignore
/// pub struct StandardComponents;
///
/// impl ComponentGroup for StandardComponents {
///     fn build(self) -> ComponentGroupBuilder {
///         ComponentGroupBuilder::new()
///             .add(ComponentDescriptor::of::<Database>("database"))
///             .add(ComponentDescriptor::of::<Chat>("chat").depends_on("database"))
///     }
/// }
///
/// // Use as is, or customized
/// host.enable(StandardComponents)?;
/// host.enable(StandardComponents.build().disable("chat"))?;
/// ```
pub trait ComponentGroup {
    /// Returns the components in this group.
    fn build(self) -> ComponentGroupBuilder;
}

/// Builder for customizing component groups.
#[derive(Debug, Default)]
pub struct ComponentGroupBuilder {
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentGroupBuilder {
    /// Creates a new empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Adds a descriptor before the one named `target`.
    ///
    /// If `target` is not found, the descriptor is added at the beginning.
    #[must_use]
    pub fn add_before(mut self, target: &str, descriptor: ComponentDescriptor) -> Self {
        let position = self.position(target).unwrap_or(0);
        self.descriptors.insert(position, descriptor);
        self
    }

    /// Adds a descriptor after the one named `target`.
    ///
    /// If `target` is not found, the descriptor is added at the end.
    #[must_use]
    pub fn add_after(mut self, target: &str, descriptor: ComponentDescriptor) -> Self {
        let position = self
            .position(target)
            .map_or(self.descriptors.len(), |i| i + 1);
        self.descriptors.insert(position, descriptor);
        self
    }

    /// Removes the descriptor named `name`. No-op if absent.
    #[must_use]
    pub fn disable(mut self, name: &str) -> Self {
        self.descriptors.retain(|d| d.name() != name);
        self
    }

    /// Returns the names in group order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(ComponentDescriptor::name)
    }

    /// Returns the number of descriptors in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::graph::DependencyGraph;
    use compound_config::schema::{ConfigSchema, Configurable};

    #[derive(Default)]
    struct Noop;

    impl Configurable for Noop {
        fn schema() -> ConfigSchema<Self> {
            ConfigSchema::new()
        }
    }

    impl Component for Noop {}

    fn named(name: &str) -> ComponentDescriptor {
        ComponentDescriptor::of::<Noop>(name)
    }

    #[test]
    fn last_registered_wins() {
        let catalog = Catalog::new()
            .with(named("a"))
            .with(named("b"))
            .with(named("a").with_description("second"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(catalog.get("a").map(ComponentDescriptor::description), Some("second"));
    }

    #[test]
    fn from_discovery_propagates_errors() {
        struct Failing;

        impl Discovery for Failing {
            fn discover(self) -> Result<Vec<ComponentDescriptor>, ComponentError> {
                Err("scan failed".into())
            }
        }

        let err = Catalog::from_discovery(Failing).unwrap_err();
        assert_eq!(err.to_string(), "scan failed");
    }

    #[test]
    fn group_builder_ordering() {
        let group = ComponentGroupBuilder::new()
            .add(named("a"))
            .add(named("c"))
            .add_before("c", named("b"))
            .add_after("c", named("d"))
            .add_before("missing", named("first"))
            .add_after("missing", named("last"));

        assert_eq!(
            group.names().collect::<Vec<_>>(),
            ["first", "a", "b", "c", "d", "last"]
        );
    }

    struct Pair;

    impl ComponentGroup for Pair {
        fn build(self) -> ComponentGroupBuilder {
            ComponentGroupBuilder::new()
                .add(named("a"))
                .add(named("b").depends_on("a"))
        }
    }

    #[test]
    fn groups_are_discovered_directly() {
        let catalog = Catalog::from_discovery(Pair).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["a", "b"]);

        let catalog = Catalog::from_discovery(Pair.build().disable("b")).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn graph_builds_from_catalog_iter() {
        let catalog = Catalog::new()
            .with(named("a"))
            .with(named("b").depends_on("a"))
            .with(named("c").depends_on("missing"));

        let (graph, missing) = DependencyGraph::build(catalog.iter());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].component, "c");
        assert_eq!(graph.dependencies_of("b"), ["a"]);
    }

    #[test]
    fn group_disable_removes_by_name() {
        let group = ComponentGroupBuilder::new()
            .add(named("a"))
            .add(named("b"))
            .disable("a")
            .disable("missing");

        assert_eq!(group.len(), 1);
        let catalog = Catalog::from_discovery(group).unwrap();
        assert!(catalog.contains("b"));
    }
}
