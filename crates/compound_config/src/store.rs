//! Configuration stores: where documents come from.
//!
//! The binder only needs to open a document by path. A missing document is
//! not an error; only a required field against a missing document is.

use crate::document::ConfigDocument;
use crate::error::StoreError;
use hashbrown::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of configuration documents.
pub trait ConfigStore: Send + Sync {
    /// Opens the document at `path`.
    ///
    /// Returns `Ok(None)` if no such document exists.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the document exists but cannot be read or
    /// parsed.
    fn open(&self, path: &str) -> Result<Option<ConfigDocument>, StoreError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for Arc<S> {
    fn open(&self, path: &str) -> Result<Option<ConfigDocument>, StoreError> {
        (**self).open(path)
    }
}

impl<S: ConfigStore + ?Sized> ConfigStore for Box<S> {
    fn open(&self, path: &str) -> Result<Option<ConfigDocument>, StoreError> {
        (**self).open(path)
    }
}

/// An in-process store holding documents by path.
///
/// # Example
///
/// ```
/// use compound_config::document::ConfigDocument;
/// use compound_config::store::{ConfigStore, MemoryStore};
///
/// let store = MemoryStore::new()
///     .with_document("app.json", ConfigDocument::new().with("name", "demo"));
///
/// assert!(store.open("app.json").unwrap().is_some());
/// assert!(store.open("other.json").unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, ConfigDocument>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the document at `path`.
    pub fn insert(&mut self, path: impl Into<String>, document: ConfigDocument) -> &mut Self {
        self.documents.insert(path.into(), document);
        self
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_document(mut self, path: impl Into<String>, document: ConfigDocument) -> Self {
        self.insert(path, document);
        self
    }

    /// Returns the number of documents held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn open(&self, path: &str) -> Result<Option<ConfigDocument>, StoreError> {
        Ok(self.documents.get(path).cloned())
    }
}

/// A store reading JSON documents from files under a root directory.
///
/// Each call to [`open`](ConfigStore::open) reads the whole file and releases
/// the handle before returning, on success and failure alike.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `root`. The directory does not need to exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file a store path maps to.
    #[must_use]
    pub fn file_for(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl ConfigStore for DirectoryStore {
    fn open(&self, path: &str) -> Result<Option<ConfigDocument>, StoreError> {
        let file = self.file_for(path);
        let text = match std::fs::read_to_string(&file) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path: file, source }),
        };

        tracing::trace!(path, file = %file.display(), "opened config document");
        ConfigDocument::from_json_str(path, &text).map(Some)
    }
}
