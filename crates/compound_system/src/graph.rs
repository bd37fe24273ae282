//! The dependency relation between catalogued components.

use crate::descriptor::ComponentDescriptor;
use hashbrown::{HashMap, HashSet};
use indexmap::IndexSet;

/// A descriptor naming a dependency that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// The dependent component.
    pub component: String,
    /// The first dependency name that did not resolve.
    pub dependency: String,
}

/// Maps each component to the names it still waits on.
///
/// Built in a single pass. A component naming an unknown dependency keeps no
/// edges at all and is reported as [`MissingDependency`]. Cycles are not
/// detected here; the scheduler sees them as a pass without progress.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependencies: HashMap<String, IndexSet<String>>,
    dependents: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    /// Builds the graph over `descriptors`.
    ///
    /// Returns the graph and every descriptor with an unresolvable dependency,
    /// in descriptor order.
    pub fn build<'a>(
        descriptors: impl IntoIterator<Item = &'a ComponentDescriptor> + Clone,
    ) -> (Self, Vec<MissingDependency>) {
        let known: HashSet<&str> = descriptors
            .clone()
            .into_iter()
            .map(ComponentDescriptor::name)
            .collect();

        let mut graph = Self::default();
        let mut missing = Vec::new();

        for descriptor in descriptors {
            let name = descriptor.name();
            let unresolved = descriptor
                .dependencies()
                .iter()
                .find(|dependency| !known.contains(dependency.as_str()));

            if let Some(dependency) = unresolved {
                missing.push(MissingDependency {
                    component: name.to_owned(),
                    dependency: dependency.clone(),
                });
                graph.dependencies.insert(name.to_owned(), IndexSet::new());
                continue;
            }

            let edges: IndexSet<String> = descriptor.dependencies().iter().cloned().collect();
            for dependency in &edges {
                graph
                    .dependents
                    .entry(dependency.clone())
                    .or_default()
                    .insert(name.to_owned());
            }
            graph.dependencies.insert(name.to_owned(), edges);
        }

        (graph, missing)
    }

    /// Returns the names `name` still waits on, in declaration order.
    #[must_use]
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.dependencies
            .get(name)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Returns true if `name` still has edges to other components.
    #[must_use]
    pub fn has_dependencies(&self, name: &str) -> bool {
        self.dependencies
            .get(name)
            .is_some_and(|edges| !edges.is_empty())
    }

    /// Removes every edge pointing at `name`.
    ///
    /// Called once `name` has loaded; its dependents stop waiting on it.
    pub fn clear_dependents_of(&mut self, name: &str) {
        let Some(dependents) = self.dependents.remove(name) else {
            return;
        };
        for dependent in dependents {
            if let Some(edges) = self.dependencies.get_mut(&dependent) {
                edges.shift_remove(name);
            }
        }
    }

    /// Returns the number of components in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Returns true if the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use compound_config::schema::{ConfigSchema, Configurable};

    struct Noop;

    impl Configurable for Noop {
        fn schema() -> ConfigSchema<Self> {
            ConfigSchema::new()
        }
    }

    impl Component for Noop {}

    fn descriptor(name: &str, deps: &[&str]) -> ComponentDescriptor {
        deps.iter().fold(
            ComponentDescriptor::new(name, || Ok(Noop)),
            |descriptor, dep| descriptor.depends_on(*dep),
        )
    }

    #[test]
    fn missing_dependency_drops_all_edges() {
        let descriptors = [
            descriptor("db", &[]),
            descriptor("chat", &["db", "ghost", "phantom"]),
        ];

        let (graph, missing) = DependencyGraph::build(&descriptors);

        assert_eq!(
            missing,
            vec![MissingDependency {
                component: "chat".into(),
                dependency: "ghost".into(),
            }]
        );
        assert!(!graph.has_dependencies("chat"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn clearing_a_loaded_component_releases_dependents() {
        let descriptors = [
            descriptor("db", &[]),
            descriptor("cache", &["db"]),
            descriptor("chat", &["cache", "db"]),
        ];

        let (mut graph, missing) = DependencyGraph::build(&descriptors);
        assert!(missing.is_empty());
        assert_eq!(graph.dependencies_of("chat"), ["cache", "db"]);

        graph.clear_dependents_of("db");
        assert_eq!(graph.dependencies_of("chat"), ["cache"]);
        assert!(!graph.has_dependencies("cache"));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let descriptors = [descriptor("db", &[]), descriptor("chat", &["db", "db"])];

        let (graph, _) = DependencyGraph::build(&descriptors);
        assert_eq!(graph.dependencies_of("chat").len(), 1);
    }

    #[test]
    fn cycles_are_left_for_the_scheduler() {
        let descriptors = [descriptor("a", &["b"]), descriptor("b", &["a"])];

        let (graph, missing) = DependencyGraph::build(&descriptors);
        assert!(missing.is_empty());
        assert!(graph.has_dependencies("a"));
        assert!(graph.has_dependencies("b"));
    }
}
