//! Host settings: where the data folder is and how to log.
//!
//! Settings come from a JSON file, the environment, or both:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `COMPOUND_DATA_DIR` | [`data_folder`](HostSettings::data_folder) |
//! | `COMPOUND_LOG` | [`log`](HostSettings::log) |
//! | `COMPOUND_LOG_FORMAT` | [`log_format`](HostSettings::log_format) |

use crate::tracing_setup::{ParseFormatError, TracingFormat, TracingSetup};
use compound_system::host::{ComponentHost, DEFAULT_COMPONENTS_FOLDER};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Environment variable naming the data folder.
pub const DATA_DIR_VAR: &str = "COMPOUND_DATA_DIR";

/// Environment variable holding a log level or filter directives.
pub const LOG_VAR: &str = "COMPOUND_LOG";

/// Environment variable naming the log format.
pub const LOG_FORMAT_VAR: &str = "COMPOUND_LOG_FORMAT";

/// Errors reading host settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings '{}': {source}", path.display())]
    Io {
        /// The settings file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings document is not valid.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment variable holds an unknown log format.
    #[error("invalid {var}: {source}")]
    Format {
        /// The offending variable.
        var: &'static str,
        /// The parse failure.
        #[source]
        source: ParseFormatError,
    },
}

/// Settings for a [`ComponentHost`] and its logging.
///
/// # Example
///
/// ```
/// use compound_core::HostSettings;
///
/// let settings = HostSettings::from_json_str(
///     r#"{ "data_folder": "/srv/compound", "log": "compound_system=debug" }"#,
/// )
/// .unwrap();
///
/// let host = settings.build_host();
/// assert_eq!(host.data_folder(), std::path::Path::new("/srv/compound"));
/// assert_eq!(settings.tracing().env_filter(), Some("compound_system=debug"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostSettings {
    /// Folder holding configuration files and the components folder.
    pub data_folder: PathBuf,
    /// Name of the components folder under the data folder.
    pub components_folder: String,
    /// A level (`debug`) or filter directives (`compound_system=debug,warn`).
    pub log: String,
    /// Log output format.
    pub log_format: TracingFormat,
    /// Whether to log span enter/exit events.
    pub span_events: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("data"),
            components_folder: DEFAULT_COMPONENTS_FOLDER.to_owned(),
            log: "info".to_owned(),
            log_format: TracingFormat::default(),
            span_events: false,
        }
    }
}

impl HostSettings {
    /// Reads settings from the process environment, starting from defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Format`] for an unknown log format.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Parses settings from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for invalid JSON or unknown fields.
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::Parse`] if it is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Overrides fields with the variables `lookup` returns. Unset and empty
    /// variables leave fields as they are.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Format`] for an unknown log format.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(folder) = var(DATA_DIR_VAR) {
            self.data_folder = PathBuf::from(folder);
        }
        if let Some(log) = var(LOG_VAR) {
            self.log = log;
        }
        if let Some(format) = var(LOG_FORMAT_VAR) {
            self.log_format = format.parse().map_err(|source| SettingsError::Format {
                var: LOG_FORMAT_VAR,
                source,
            })?;
        }
        Ok(self)
    }

    /// Returns the tracing setup these settings describe.
    ///
    /// A bare level sets the default level; anything else is used as filter
    /// directives.
    #[must_use]
    pub fn tracing(&self) -> TracingSetup {
        let setup = TracingSetup::new()
            .with_format(self.log_format)
            .with_span_events(self.span_events);
        match self.log.trim().parse::<Level>() {
            Ok(level) => setup.with_level(level),
            Err(_) => setup.with_env_filter(self.log.trim()),
        }
    }

    /// Creates a host reading configuration files from the data folder.
    #[must_use]
    pub fn build_host(&self) -> ComponentHost {
        ComponentHost::open(&self.data_folder).with_components_folder(&self.components_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let pairs = pairs.to_vec();
        move |name| {
            pairs
                .iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn defaults() {
        let settings = HostSettings::default();
        assert_eq!(settings.data_folder, PathBuf::from("data"));
        assert_eq!(settings.components_folder, "components");
        assert_eq!(settings.tracing().level(), Level::INFO);
    }

    #[test]
    fn overrides_apply_on_top() {
        let settings = HostSettings::default()
            .with_overrides(vars(&[
                (DATA_DIR_VAR, "/srv/compound"),
                (LOG_VAR, "debug"),
                (LOG_FORMAT_VAR, "json"),
            ]))
            .unwrap();

        assert_eq!(settings.data_folder, PathBuf::from("/srv/compound"));
        assert_eq!(settings.log_format, TracingFormat::Json);
        assert_eq!(settings.tracing().level(), Level::DEBUG);
        assert!(settings.tracing().env_filter().is_none());
    }

    #[test]
    fn empty_variables_are_ignored() {
        let settings = HostSettings::default()
            .with_overrides(vars(&[(DATA_DIR_VAR, "  "), (LOG_VAR, "")]))
            .unwrap();
        assert_eq!(settings, HostSettings::default());
    }

    #[test]
    fn unknown_format_is_an_error() {
        let err = HostSettings::default()
            .with_overrides(vars(&[(LOG_FORMAT_VAR, "xml")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Format {
                var: LOG_FORMAT_VAR,
                ..
            }
        ));
    }

    #[test]
    fn directives_become_an_env_filter() {
        let settings = HostSettings {
            log: "compound_system=debug,warn".to_owned(),
            ..HostSettings::default()
        };
        assert_eq!(
            settings.tracing().env_filter(),
            Some("compound_system=debug,warn")
        );
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = HostSettings::from_json_str(r#"{ "data_dir": "x" }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn json_keeps_defaults_for_missing_fields() {
        let settings =
            HostSettings::from_json_str(r#"{ "log_format": "compact", "span_events": true }"#)
                .unwrap();
        assert_eq!(settings.log_format, TracingFormat::Compact);
        assert!(settings.span_events);
        assert_eq!(settings.log, "info");
    }
}
