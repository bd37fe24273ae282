//! Hierarchical configuration documents addressed by dotted keys.

use crate::error::StoreError;
use crate::value::{ConfigType, ValueKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A nested key-value configuration document.
///
/// Keys are dotted paths through nested sections: `db.port` names the `port`
/// entry of the `db` section.
///
/// # Example
///
/// ```
/// use compound_config::document::ConfigDocument;
///
/// let doc = ConfigDocument::from_json_str(
///     "database.json",
///     r#"{ "db": { "host": "localhost", "port": 5432 } }"#,
/// )
/// .unwrap();
///
/// assert!(doc.contains("db.port"));
/// assert_eq!(doc.get_as::<u16>("db.port"), Some(5432));
/// assert!(!doc.contains("db.user"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing mapping.
    #[must_use]
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Wraps a native value, which must be a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAMapping`] if `value` is not an object.
    pub fn from_value(path: &str, value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(StoreError::NotAMapping {
                path: path.to_owned(),
                found: ValueKind::of(&other),
            }),
        }
    }

    /// Parses a JSON document. `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] for malformed JSON and
    /// [`StoreError::NotAMapping`] if the root is not an object.
    pub fn from_json_str(path: &str, text: &str) -> Result<Self, StoreError> {
        let value = serde_json::from_str(text).map_err(|source| StoreError::Parse {
            path: path.to_owned(),
            source,
        })?;
        Self::from_value(path, value)
    }

    /// Returns true if the dotted key is present, even when it holds `null`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the raw value stored at the dotted key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns the value at the dotted key converted to `T`.
    #[must_use]
    pub fn get_as<T: ConfigType>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(T::from_config)
    }

    /// Returns a copy of the nested section at the dotted key.
    #[must_use]
    pub fn section(&self, key: &str) -> Option<ConfigDocument> {
        self.get_as(key)
    }

    /// Sets the value at the dotted key, creating intermediate sections and
    /// replacing any non-section value in the way.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in segments {
            let entry = current
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(next) = entry else {
                unreachable!("entry was just made an object");
            };
            current = next;
        }
        current.insert(last.to_owned(), value.into());
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Returns true if the document has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Consumes the document, returning the native value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}
