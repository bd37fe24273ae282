//! The configuration binder.
//!
//! [`Binder`] walks a type's [`ConfigSchema`], finds each field's value in the
//! configuration store, converts it and writes it through the field's setter.
//!
//! # Resolution
//!
//! For every field:
//!
//! 1. The document comes from the field's own path, else the type's path,
//!    else the caller's default document.
//! 2. The key is the field's key (or its name), prefixed with the base key.
//! 3. A missing or unreadable document, a missing key or a missing value
//!    fails the bind if the field is required, and skips the field otherwise.
//! 4. The raw value goes through the field's resolver, or is coerced to the
//!    field's type. Numbers are narrowed or widened to the field's width.
//! 5. Strings of `colorize`d fields pass through the [`ColorTranslator`].
//! 6. The value must be of the field's type, and the setter must accept it.
//!
//! The first required field that cannot be satisfied ends the bind with an
//! error. Optional fields that cannot be satisfied are logged and skipped.
//! Ancestors are bound after the type's own fields, with the caller's
//! defaults. Nested sections are bound last, from their owner's document.

use crate::colorize::{AlternateColorCodes, ColorTranslator};
use crate::document::ConfigDocument;
use crate::error::{BindError, FieldSite, ResolveError, StoreError, panic_message};
use crate::resolver::ResolverSpec;
use crate::schema::{Bind, ConfigSchema, Configurable, FieldBinding, FieldType};
use crate::store::ConfigStore;
use crate::value::{BoundValue, ValueKind};
use core::fmt;
use hashbrown::HashMap;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// BindDefaults
// ─────────────────────────────────────────────────────────────────────────────

/// Caller-supplied defaults for one bind: the fallback document, its path and
/// the base key prefixed to every field key.
///
/// A fallback document that failed to open is kept as its error. Only the
/// fields that fall back to it see the failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindDefaults<'a> {
    document: Option<&'a ConfigDocument>,
    failure: Option<&'a Arc<StoreError>>,
    path: Option<&'a str>,
    base_key: Option<&'a str>,
}

impl<'a> BindDefaults<'a> {
    /// No default document, no path, no base key.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates defaults from their parts.
    #[must_use]
    pub fn new(
        document: Option<&'a ConfigDocument>,
        path: Option<&'a str>,
        base_key: Option<&'a str>,
    ) -> Self {
        Self {
            document,
            failure: None,
            path,
            base_key,
        }
    }

    /// Creates defaults from the outcome of opening the document at `path`.
    #[must_use]
    pub fn opened(
        opened: Result<Option<&'a ConfigDocument>, &'a Arc<StoreError>>,
        path: Option<&'a str>,
        base_key: Option<&'a str>,
    ) -> Self {
        match opened {
            Ok(document) => Self::new(document, path, base_key),
            Err(failure) => Self {
                document: None,
                failure: Some(failure),
                path,
                base_key,
            },
        }
    }

    /// Returns the default document.
    #[must_use]
    pub fn document(&self) -> Option<&'a ConfigDocument> {
        self.document
    }

    /// Returns the error the default document failed to open with, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&'a Arc<StoreError>> {
        self.failure
    }

    /// Returns the default document's path.
    #[must_use]
    pub fn path(&self) -> Option<&'a str> {
        self.path
    }

    /// Returns the base key.
    #[must_use]
    pub fn base_key(&self) -> Option<&'a str> {
        self.base_key
    }

    /// Returns the same defaults with a different base key.
    #[must_use]
    pub fn with_base_key<'b>(&self, base_key: &'b str) -> BindDefaults<'b>
    where
        'a: 'b,
    {
        BindDefaults {
            document: self.document,
            failure: self.failure,
            path: self.path,
            base_key: Some(base_key),
        }
    }

    /// Returns `key` prefixed with the base key, if there is one.
    #[must_use]
    pub fn prefixed(&self, key: &str) -> String {
        match self.base_key {
            Some(base) => format!("{base}.{key}"),
            None => key.to_owned(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────────

type Opened = Result<Option<ConfigDocument>, Arc<StoreError>>;

/// Documents opened during one bind, each opened at most once and released
/// when the bind returns.
struct Documents<'a> {
    store: &'a dyn ConfigStore,
    opened: HashMap<String, Opened>,
}

impl<'a> Documents<'a> {
    fn new(store: &'a dyn ConfigStore) -> Self {
        Self {
            store,
            opened: HashMap::new(),
        }
    }

    fn open(&mut self, path: &str) -> Result<Option<&ConfigDocument>, &Arc<StoreError>> {
        let store = self.store;
        let opened = self
            .opened
            .entry(path.to_owned())
            .or_insert_with(|| store.open(path).map_err(Arc::new));
        match opened {
            Ok(document) => Ok(document.as_ref()),
            Err(err) => Err(err),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Binder
// ─────────────────────────────────────────────────────────────────────────────

/// Populates configurable values from a [`ConfigStore`].
///
/// # Example
///
/// ```
/// use compound_config::prelude::*;
///
/// #[derive(Default)]
/// struct Server {
///     port: f64,
///     motd: String,
/// }
///
/// impl Configurable for Server {
///     fn schema() -> ConfigSchema<Self> {
///         ConfigSchema::new()
///             .path("server.json")
///             .field(FieldBinding::new("port", |s: &mut Server| &mut s.port))
///             .field(FieldBinding::new("motd", |s: &mut Server| &mut s.motd).colorize(true))
///     }
/// }
///
/// let store = MemoryStore::new().with_document(
///     "server.json",
///     ConfigDocument::new().with("port", 8080).with("motd", "&cWelcome"),
/// );
/// let binder = Binder::new(store);
///
/// let mut server = Server::default();
/// binder.bind(&mut server).unwrap();
/// assert_eq!(server.port, 8080.0);
/// assert_eq!(server.motd, "\u{00A7}cWelcome");
/// ```
#[derive(Clone)]
pub struct Binder {
    store: Arc<dyn ConfigStore>,
    colors: Arc<dyn ColorTranslator>,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder").finish_non_exhaustive()
    }
}

impl Binder {
    /// Creates a binder over `store`, translating `&` color codes.
    #[must_use]
    pub fn new(store: impl ConfigStore + 'static) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a binder over a shared store.
    #[must_use]
    pub fn from_shared(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            colors: Arc::new(AlternateColorCodes::default()),
        }
    }

    /// Replaces the color translator.
    #[must_use]
    pub fn with_colors(mut self, colors: impl ColorTranslator + 'static) -> Self {
        self.colors = Arc::new(colors);
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &dyn ConfigStore {
        &*self.store
    }

    /// Binds `target` using only field- and type-level document paths.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    pub fn bind<T: Configurable>(&self, target: &mut T) -> Result<(), BindError> {
        self.bind_with_defaults(target, &BindDefaults::none())
    }

    /// Binds `target`, opening `path` as the default document.
    ///
    /// A default document that cannot be read counts as missing for every
    /// field falling back to it.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    pub fn bind_with_path<T: Configurable>(
        &self,
        target: &mut T,
        path: &str,
        base_key: Option<&str>,
    ) -> Result<(), BindError> {
        let opened = self.store.open(path).map_err(Arc::new);
        self.bind_with_defaults(
            target,
            &BindDefaults::opened(opened.as_ref().map(Option::as_ref), Some(path), base_key),
        )
    }

    /// Binds `target` against an already loaded default document.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    pub fn bind_with_document<T: Configurable>(
        &self,
        target: &mut T,
        document: &ConfigDocument,
        path: Option<&str>,
        base_key: Option<&str>,
    ) -> Result<(), BindError> {
        self.bind_with_defaults(target, &BindDefaults::new(Some(document), path, base_key))
    }

    /// Binds a type-erased target, opening `path` as the default document if
    /// one is given.
    ///
    /// # Errors
    ///
    /// Same as [`bind_with_path`](Self::bind_with_path).
    pub fn bind_dyn(
        &self,
        target: &mut dyn Bind,
        path: Option<&str>,
        base_key: Option<&str>,
    ) -> Result<(), BindError> {
        let opened = match path {
            Some(path) => self.store.open(path).map_err(Arc::new),
            None => Ok(None),
        };
        target.bind_config(
            self,
            &BindDefaults::opened(opened.as_ref().map(Option::as_ref), path, base_key),
        )
    }

    /// Binds `target` with explicit defaults.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    pub fn bind_with_defaults<T: Configurable>(
        &self,
        target: &mut T,
        defaults: &BindDefaults<'_>,
    ) -> Result<(), BindError> {
        let schema = T::schema();
        let mut documents = Documents::new(&*self.store);

        for field in schema.fields() {
            match self.bind_field(target, &schema, field, defaults, &mut documents) {
                Ok(()) => {}
                Err(err) if field.is_required() => {
                    tracing::warn!(
                        owner = schema.type_name(),
                        field = field.name(),
                        "{err}"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        owner = schema.type_name(),
                        field = field.name(),
                        "skipping optional field: {err}"
                    );
                }
            }
        }

        for ancestor in &schema.ancestors {
            (ancestor.bind)(self, target, defaults)?;
        }

        if !schema.nested.is_empty() {
            // Nested sections live in their owner's document.
            let owner = match schema.document_path() {
                Some(path) => {
                    BindDefaults::opened(documents.open(path), Some(path), defaults.base_key())
                }
                None => *defaults,
            };
            for nested in &schema.nested {
                (nested.bind)(self, target, &owner)?;
            }
        }

        Ok(())
    }

    fn bind_field<T>(
        &self,
        target: &mut T,
        schema: &ConfigSchema<T>,
        field: &FieldBinding<T>,
        defaults: &BindDefaults<'_>,
        documents: &mut Documents<'_>,
    ) -> Result<(), BindError> {
        let key = defaults.prefixed(field.key_or_name());
        let (path, document) = match field.document_path().or(schema.document_path()) {
            Some(path) => (Some(path), documents.open(path).map_err(Arc::clone)),
            None => match defaults.failure() {
                Some(failure) => (defaults.path(), Err(Arc::clone(failure))),
                None => (defaults.path(), Ok(defaults.document())),
            },
        };

        let site = || FieldSite {
            owner: schema.type_name(),
            field: field.name(),
            key: key.clone(),
            path: path.map(str::to_owned),
        };

        let document = match document {
            Ok(Some(document)) => document,
            Ok(None) => return Err(BindError::MissingDocument(site())),
            Err(source) => {
                return Err(BindError::Store {
                    site: site(),
                    source,
                });
            }
        };

        let Some(raw) = document.get(&key) else {
            return Err(BindError::MissingKey(site()));
        };
        if raw.is_null() {
            return Err(BindError::MissingValue(site()));
        }

        let ty = field.field_type();
        let mut value = match field.resolver_spec() {
            Some(resolver) => self.resolve(resolver, ty, raw, &site)?,
            None => ty.convert(raw).ok_or_else(|| BindError::InvalidValue {
                site: site(),
                expected: ty.type_name(),
                found: ValueKind::of(raw),
            })?,
        };

        if field.is_colorized()
            && let Some(text) = value.downcast_mut::<String>()
        {
            *text = self.colors.translate(text);
        }

        if !ty.matches(&*value) {
            return Err(BindError::InvalidValue {
                site: site(),
                expected: ty.type_name(),
                found: ValueKind::of(raw),
            });
        }

        field
            .set(target, value)
            .map_err(|source| BindError::Assign {
                site: site(),
                source,
            })
    }

    fn resolve(
        &self,
        resolver: &ResolverSpec,
        ty: &FieldType,
        raw: &Value,
        site: &dyn Fn() -> FieldSite,
    ) -> Result<BoundValue, BindError> {
        let failed = |source| BindError::Resolver {
            site: site(),
            resolver: resolver.name(),
            source,
        };

        if resolver.output_type_id() != ty.type_id() {
            return Err(BindError::ResolverMismatch {
                site: site(),
                resolver: resolver.name(),
                produces: resolver.output_name(),
                expected: ty.type_name(),
            });
        }

        if !resolver.accepts(raw) {
            return Err(failed(ResolveError::InvalidInput {
                expected: resolver.input_kind(),
                found: ValueKind::of(raw),
            }));
        }

        let instance = resolver.instantiate().map_err(failed)?;
        match panic::catch_unwind(AssertUnwindSafe(|| instance.resolve(raw))) {
            Ok(result) => result.map_err(failed),
            Err(payload) => Err(failed(ResolveError::Panicked(panic_message(&*payload)))),
        }
    }
}

