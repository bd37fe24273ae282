//! Per-component runtime state.

use crate::component::Component;
use crate::error::LoadFailure;
use core::fmt;

/// Load state of a component. Moves from `Pending` to exactly one of the
/// other two, and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Not yet attempted, or waiting on dependencies.
    Pending,
    /// Instantiated, configured and loaded.
    Loaded,
    /// Failed, or blocked by a failed dependency.
    Failed,
}

impl ComponentState {
    /// Returns true for `Loaded` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        })
    }
}

/// The mutable runtime record of one component.
pub struct ComponentRecord {
    name: String,
    description: String,
    state: ComponentState,
    instance: Option<Box<dyn Component>>,
    failures: Vec<LoadFailure>,
    fail_trace: Option<String>,
}

impl fmt::Debug for ComponentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRecord")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("instantiated", &self.instance.is_some())
            .field("failures", &self.failures)
            .field("fail_trace", &self.fail_trace.is_some())
            .finish_non_exhaustive()
    }
}

impl ComponentRecord {
    pub(crate) fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            state: ComponentState::Pending,
            instance: None,
            failures: Vec::new(),
            fail_trace: None,
        }
    }

    /// Returns the component's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the component's description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ComponentState {
        self.state
    }

    /// Returns the instance, if instantiation succeeded.
    ///
    /// A failed component keeps its instance when it failed after
    /// instantiation.
    #[must_use]
    pub fn instance(&self) -> Option<&dyn Component> {
        self.instance.as_deref()
    }

    /// Returns the recorded failures, most recent first.
    #[must_use]
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Returns the failure messages, most recent first.
    pub fn fail_reasons(&self) -> impl Iterator<Item = String> + '_ {
        self.failures.iter().map(ToString::to_string)
    }

    /// Returns diagnostic detail captured with the latest failure.
    #[must_use]
    pub fn fail_trace(&self) -> Option<&str> {
        self.fail_trace.as_deref()
    }

    /// Returns the instance if the component is loaded.
    #[must_use]
    pub fn loaded_instance(&self) -> Option<&dyn Component> {
        match self.state {
            ComponentState::Loaded => self.instance.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn loaded_instance_mut(&mut self) -> Option<&mut dyn Component> {
        match self.state {
            ComponentState::Loaded => self.instance.as_deref_mut(),
            _ => None,
        }
    }

    pub(crate) fn mark_loaded(&mut self, instance: Box<dyn Component>) {
        debug_assert_eq!(self.state, ComponentState::Pending, "{} already terminal", self.name);
        self.state = ComponentState::Loaded;
        self.instance = Some(instance);
    }

    pub(crate) fn mark_failed(
        &mut self,
        failure: LoadFailure,
        instance: Option<Box<dyn Component>>,
        trace: Option<String>,
    ) {
        debug_assert_eq!(self.state, ComponentState::Pending, "{} already terminal", self.name);
        self.state = ComponentState::Failed;
        if instance.is_some() {
            self.instance = instance;
        }
        self.record_failure(failure, trace);
    }

    /// Records a failure without changing state.
    pub(crate) fn record_failure(&mut self, failure: LoadFailure, trace: Option<String>) {
        self.failures.insert(0, failure);
        if trace.is_some() {
            self.fail_trace = trace;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_most_recent_first() {
        let mut record = ComponentRecord::new("chat", "");
        record.mark_failed(
            LoadFailure::Hook {
                reason: "first".into(),
            },
            None,
            Some("trace-1".into()),
        );
        record.record_failure(
            LoadFailure::Unload {
                reason: "second".into(),
            },
            None,
        );

        let reasons: Vec<_> = record.fail_reasons().collect();
        assert_eq!(
            reasons,
            vec!["unload hook failed: second", "load hook failed: first"]
        );
        assert_eq!(record.fail_trace(), Some("trace-1"));
        assert_eq!(record.state(), ComponentState::Failed);
    }

    #[test]
    fn terminal_states() {
        assert!(!ComponentState::Pending.is_terminal());
        assert!(ComponentState::Loaded.is_terminal());
        assert!(ComponentState::Failed.is_terminal());
    }
}
