//! Error types for component loading.

use crate::component::ComponentError;
use compound_config::error::BindError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a component failed to load, or failed to unload.
#[derive(Debug, Error)]
pub enum LoadFailure {
    /// A declared dependency is not in the catalog.
    #[error("missing dependency '{dependency}'")]
    MissingDependency {
        /// The missing dependency's name.
        dependency: String,
    },

    /// A dependency failed, so this component was never attempted.
    #[error("blocked by failed dependency '{dependency}'")]
    DependencyFailed {
        /// The failed dependency's name.
        dependency: String,
    },

    /// A required configuration field could not be bound.
    #[error("unable to inject config: {source}")]
    Binding {
        /// The binding failure.
        #[source]
        source: BindError,
    },

    /// The component's load hook reported failure.
    #[error("load hook failed: {reason}")]
    Hook {
        /// The hook's error message.
        reason: String,
    },

    /// Instantiation failed or panicked.
    #[error("unexpected error: {message}")]
    Unexpected {
        /// What went wrong.
        message: String,
    },

    /// The component's unload hook reported failure during teardown.
    #[error("unload hook failed: {reason}")]
    Unload {
        /// The hook's error message.
        reason: String,
    },
}

/// Errors that stop the host before any component is loaded.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The components folder does not exist and cannot be created.
    #[error("unable to create component folder '{}': {source}", path.display())]
    ComponentFolder {
        /// The folder that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The discovery collaborator failed.
    #[error("component discovery failed: {source}")]
    Discovery {
        /// The discovery error.
        #[source]
        source: ComponentError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_reason_names_dependency() {
        let failure = LoadFailure::DependencyFailed {
            dependency: "database".into(),
        };
        assert_eq!(
            failure.to_string(),
            "blocked by failed dependency 'database'"
        );
    }

    #[test]
    fn folder_error_names_path() {
        let err = SetupError::ComponentFolder {
            path: PathBuf::from("/srv/data/components"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/srv/data/components"));
    }
}
