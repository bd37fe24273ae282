//! Error types for configuration stores and field binding.

use crate::value::ValueKind;
use core::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a [`ConfigStore`](crate::store::ConfigStore) while opening a document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document exists but could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document could not be parsed.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        /// The store-relative path of the document.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed, but its root is not a mapping.
    #[error("config '{path}' must contain a mapping at its root, found {found}")]
    NotAMapping {
        /// The store-relative path of the document.
        path: String,
        /// The kind of value found at the root.
        found: ValueKind,
    },
}

/// Errors produced by a [`Resolver`](crate::resolver::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolver itself could not be constructed.
    #[error("cannot instantiate resolver: {0}")]
    Instantiate(String),

    /// The raw value is not of the resolver's input type.
    #[error("expected {expected} input, found {found}")]
    InvalidInput {
        /// The input kind the resolver accepts.
        expected: ValueKind,
        /// The kind of the raw value.
        found: ValueKind,
    },

    /// The resolver rejected the value.
    #[error("{0}")]
    Rejected(String),

    /// The resolver panicked.
    #[error("resolver panicked: {0}")]
    Panicked(String),
}

impl ResolveError {
    /// Creates a [`Rejected`](Self::Rejected) error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Creates an [`Instantiate`](Self::Instantiate) error.
    pub fn instantiate(msg: impl Into<String>) -> Self {
        Self::Instantiate(msg.into())
    }
}

/// Errors raised while writing a bound value into its field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    /// The value handed to the setter is not of the field's type.
    #[error("expected a value of type '{expected}'")]
    TypeMismatch {
        /// The field's type name.
        expected: &'static str,
    },

    /// A custom setter refused the value.
    #[error("{0}")]
    Rejected(String),
}

impl AssignError {
    /// Creates a [`Rejected`](Self::Rejected) error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

/// Where a binding failure happened: the field, its owning type, the
/// effective key and the document path it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSite {
    /// Name of the type declaring the field.
    pub owner: &'static str,
    /// Name of the field.
    pub field: &'static str,
    /// Effective dotted key, including any base key prefix.
    pub key: String,
    /// Document path the value was looked up in, if one resolved.
    pub path: Option<String>,
}

impl fmt::Display for FieldSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "key '{}' of field '{}' in '{}'",
            self.key, self.field, self.owner
        )?;
        if let Some(path) = &self.path {
            write!(f, " from config '{path}'")?;
        }
        Ok(())
    }
}

/// A field binding that could not be satisfied.
///
/// Every variant names the [`FieldSite`] that failed, so the message always
/// mentions the key and the owning type.
#[derive(Debug, Error)]
pub enum BindError {
    /// No configuration document resolved for the field.
    #[error("could not load a config document for {0}")]
    MissingDocument(FieldSite),

    /// The resolved document does not contain the key.
    #[error("config does not contain required {0}")]
    MissingKey(FieldSite),

    /// The key is present but holds no value.
    #[error("missing value for {0}")]
    MissingValue(FieldSite),

    /// The resolver's output type is not the field's type.
    #[error("resolver '{resolver}' for {site} produces '{produces}', field expects '{expected}'")]
    ResolverMismatch {
        /// The failing field.
        site: FieldSite,
        /// The resolver type name.
        resolver: &'static str,
        /// The resolver's output type name.
        produces: &'static str,
        /// The field's type name.
        expected: &'static str,
    },

    /// The resolver could not be constructed or failed to transform the value.
    #[error("invalid resolver '{resolver}' for {site}: {source}")]
    Resolver {
        /// The failing field.
        site: FieldSite,
        /// The resolver type name.
        resolver: &'static str,
        /// What went wrong.
        #[source]
        source: ResolveError,
    },

    /// The value is not of the field's type, even after coercion.
    #[error("invalid value for {site}: expected '{expected}', found {found}")]
    InvalidValue {
        /// The failing field.
        site: FieldSite,
        /// The field's type name.
        expected: &'static str,
        /// The kind of the raw value.
        found: ValueKind,
    },

    /// The setter refused the value.
    #[error("unable to set value from {site}: {source}")]
    Assign {
        /// The failing field.
        site: FieldSite,
        /// What went wrong.
        #[source]
        source: AssignError,
    },

    /// The store failed while opening the field's document.
    #[error("could not read config for {site}: {source}")]
    Store {
        /// The failing field.
        site: FieldSite,
        /// The store failure, shared by every field reading the same document.
        #[source]
        source: Arc<StoreError>,
    },
}

impl BindError {
    /// Returns the field the failure is attributed to.
    #[must_use]
    pub fn site(&self) -> &FieldSite {
        match self {
            Self::MissingDocument(site) | Self::MissingKey(site) | Self::MissingValue(site) => site,
            Self::ResolverMismatch { site, .. }
            | Self::Resolver { site, .. }
            | Self::InvalidValue { site, .. }
            | Self::Assign { site, .. }
            | Self::Store { site, .. } => site,
        }
    }

    /// Returns diagnostic detail for failures caused by an underlying error.
    ///
    /// Missing keys and plain type mismatches carry no trace.
    #[must_use]
    pub fn trace(&self) -> Option<String> {
        match self {
            Self::Resolver { source, .. } => Some(format!("{source:?}")),
            Self::Assign { source, .. } => Some(format!("{source:?}")),
            Self::Store { source, .. } => Some(format!("{source:?}")),
            _ => None,
        }
    }
}

/// Extracts the message of a caught panic.
///
/// Payloads that are neither `&str` nor `String` yield a placeholder.
#[must_use]
pub fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
