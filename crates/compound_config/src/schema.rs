//! Binding specifications: the per-type table of configurable fields.
//!
//! A [`ConfigSchema`] lists, for one type, every field the binder may write,
//! how to find its value, and a setter that writes it. Ancestor types are
//! modelled as embedded values reached through a projection, and nested
//! sections are bound under a prefixed key.
//!
//! Schemas are usually generated with `#[derive(Configurable)]`, but can be
//! written by hand:
//!
//! ```
//! use compound_config::prelude::*;
//!
//! #[derive(Default)]
//! struct Database {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Configurable for Database {
//!     fn schema() -> ConfigSchema<Self> {
//!         ConfigSchema::new()
//!             .path("database.json")
//!             .field(FieldBinding::new("host", |db: &mut Database| &mut db.host))
//!             .field(
//!                 FieldBinding::new("port", |db: &mut Database| &mut db.port)
//!                     .key("db.port")
//!                     .required(false),
//!             )
//!     }
//! }
//!
//! let schema = Database::schema();
//! assert_eq!(schema.fields().len(), 2);
//! ```

use crate::binder::{BindDefaults, Binder};
use crate::error::{AssignError, BindError};
use crate::resolver::ResolverSpec;
use crate::value::{BoundValue, ConfigType, ValueKind};
use core::any::{Any, TypeId};
use core::fmt;
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// FieldType
// ─────────────────────────────────────────────────────────────────────────────

/// The declared type of a bindable field.
#[derive(Clone, Copy)]
pub struct FieldType {
    type_id: TypeId,
    type_name: &'static str,
    kind: Option<ValueKind>,
    convert: Option<fn(&Value) -> Option<BoundValue>>,
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldType")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

fn convert_boxed<V: ConfigType>(raw: &Value) -> Option<BoundValue> {
    V::from_config(raw).map(|value| Box::new(value) as BoundValue)
}

impl FieldType {
    /// A field whose values come straight from the document.
    #[must_use]
    pub fn of<V: ConfigType>() -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            type_name: core::any::type_name::<V>(),
            kind: Some(V::KIND),
            convert: Some(convert_boxed::<V>),
        }
    }

    /// A field that can only be bound through a resolver.
    #[must_use]
    pub fn opaque<V: Any + Send>() -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            type_name: core::any::type_name::<V>(),
            kind: None,
            convert: None,
        }
    }

    /// Returns the field type's `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the field type's name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the native kind the field reads, or `None` for opaque types.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    /// Coerces a native value into the field's type.
    ///
    /// Returns `None` for opaque types and for values of the wrong kind.
    #[must_use]
    pub fn convert(&self, raw: &Value) -> Option<BoundValue> {
        self.convert.and_then(|convert| convert(raw))
    }

    /// Returns true if `value` is an instance of the field's type.
    #[must_use]
    pub fn matches(&self, value: &(dyn Any + Send)) -> bool {
        value.type_id() == self.type_id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FieldBinding
// ─────────────────────────────────────────────────────────────────────────────

/// Writes a bound value into a field of `T`.
pub type Setter<T> = Box<dyn Fn(&mut T, BoundValue) -> Result<(), AssignError> + Send + Sync>;

/// Writes `value` into `slot` if it holds a `V`.
///
/// # Errors
///
/// Returns [`AssignError::TypeMismatch`] if `value` is not a `V`.
pub fn assign<V: Any>(slot: &mut V, value: BoundValue) -> Result<(), AssignError> {
    let value = value
        .downcast::<V>()
        .map_err(|_| AssignError::TypeMismatch {
            expected: core::any::type_name::<V>(),
        })?;
    *slot = *value;
    Ok(())
}

/// The binding specification of one field.
pub struct FieldBinding<T> {
    name: &'static str,
    key: Option<String>,
    path: Option<String>,
    required: bool,
    colorize: bool,
    resolver: Option<ResolverSpec>,
    ty: FieldType,
    setter: Setter<T>,
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("path", &self.path)
            .field("required", &self.required)
            .field("colorize", &self.colorize)
            .field("resolver", &self.resolver)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> FieldBinding<T> {
    /// Binds a field read directly from the document.
    ///
    /// The field is required, keyed by its name and not colorized until
    /// configured otherwise.
    #[must_use]
    pub fn new<V: ConfigType>(name: &'static str, access: fn(&mut T) -> &mut V) -> Self {
        Self::with_setter(name, FieldType::of::<V>(), move |target: &mut T, value| {
            assign(access(target), value)
        })
    }

    /// Binds a field whose value is produced by `resolver`.
    #[must_use]
    pub fn resolved<V: Any + Send>(
        name: &'static str,
        access: fn(&mut T) -> &mut V,
        resolver: ResolverSpec,
    ) -> Self {
        Self::with_setter(name, FieldType::opaque::<V>(), move |target: &mut T, value| {
            assign(access(target), value)
        })
        .resolver(resolver)
    }

    /// Binds a field through a custom setter, e.g. one that validates.
    #[must_use]
    pub fn with_setter<F>(name: &'static str, ty: FieldType, setter: F) -> Self
    where
        F: Fn(&mut T, BoundValue) -> Result<(), AssignError> + Send + Sync + 'static,
    {
        Self {
            name,
            key: None,
            path: None,
            required: true,
            colorize: false,
            resolver: None,
            ty,
            setter: Box::new(setter),
        }
    }
}

impl<T> FieldBinding<T> {
    /// Sets the dotted key, replacing the field name.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Reads the field from its own document instead of the type's.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets whether a missing or invalid value fails the whole bind.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets whether string values are color-translated before assignment.
    #[must_use]
    pub fn colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Routes the raw value through `resolver`.
    #[must_use]
    pub fn resolver(mut self, resolver: ResolverSpec) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the configured key, or the field name.
    #[must_use]
    pub fn key_or_name(&self) -> &str {
        self.key.as_deref().unwrap_or(self.name)
    }

    /// Returns the field-level document path.
    #[must_use]
    pub fn document_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns true if the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns true if string values are color-translated.
    #[must_use]
    pub fn is_colorized(&self) -> bool {
        self.colorize
    }

    /// Returns the field's resolver, if any.
    #[must_use]
    pub fn resolver_spec(&self) -> Option<&ResolverSpec> {
        self.resolver.as_ref()
    }

    /// Returns the field's declared type.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    /// Writes `value` into the field of `target`.
    ///
    /// # Errors
    ///
    /// Returns whatever the setter returns.
    pub fn set(&self, target: &mut T, value: BoundValue) -> Result<(), AssignError> {
        (self.setter)(target, value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ConfigSchema
// ─────────────────────────────────────────────────────────────────────────────

/// Binds an embedded value of `T` with the binder, given the caller's defaults.
type SubBinder<T> =
    Box<dyn Fn(&Binder, &mut T, &BindDefaults<'_>) -> Result<(), BindError> + Send + Sync>;

/// An embedded value bound as part of its owner.
pub(crate) struct Embedded<T> {
    pub(crate) name: &'static str,
    pub(crate) bind: SubBinder<T>,
}

/// The binding specification of a type: its document path, its fields, its
/// ancestors and its nested sections.
pub struct ConfigSchema<T> {
    type_name: &'static str,
    path: Option<String>,
    fields: Vec<FieldBinding<T>>,
    pub(crate) ancestors: Vec<Embedded<T>>,
    pub(crate) nested: Vec<Embedded<T>>,
}

impl<T> fmt::Debug for ConfigSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSchema")
            .field("type_name", &self.type_name)
            .field("path", &self.path)
            .field("fields", &self.fields)
            .field(
                "ancestors",
                &self.ancestors.iter().map(|a| a.name).collect::<Vec<_>>(),
            )
            .field(
                "nested",
                &self.nested.iter().map(|n| n.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: 'static> Default for ConfigSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ConfigSchema<T> {
    /// Creates an empty schema for `T`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            path: None,
            fields: Vec::new(),
            ancestors: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Sets the type-level document path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldBinding<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares an embedded ancestor whose own schema is bound after `T`'s
    /// fields, with the same defaults and base key.
    #[must_use]
    pub fn extends<P: Configurable>(mut self, access: fn(&mut T) -> &mut P) -> Self {
        self.ancestors.push(Embedded {
            name: core::any::type_name::<P>(),
            bind: Box::new(
                move |binder: &Binder, target: &mut T, defaults: &BindDefaults<'_>| {
                    binder.bind_with_defaults(access(target), defaults)
                },
            ),
        });
        self
    }

    /// Declares a nested section: the embedded value is bound from the same
    /// document with `key` appended to the base key.
    #[must_use]
    pub fn nested<P: Configurable>(mut self, key: &'static str, access: fn(&mut T) -> &mut P) -> Self {
        self.nested.push(Embedded {
            name: key,
            bind: Box::new(
                move |binder: &Binder, target: &mut T, defaults: &BindDefaults<'_>| {
                    let base_key = defaults.prefixed(key);
                    binder.bind_with_defaults(access(target), &defaults.with_base_key(&base_key))
                },
            ),
        });
        self
    }
}

impl<T> ConfigSchema<T> {
    /// Returns the name of the type this schema describes.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type-level document path.
    #[must_use]
    pub fn document_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldBinding<T>] {
        &self.fields
    }

    /// Returns the number of embedded ancestors.
    #[must_use]
    pub fn ancestor_count(&self) -> usize {
        self.ancestors.len()
    }

    /// Returns the keys of nested sections.
    #[must_use]
    pub fn nested_keys(&self) -> Vec<&'static str> {
        self.nested.iter().map(|n| n.name).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configurable / Bind
// ─────────────────────────────────────────────────────────────────────────────

/// A type with a binding specification.
///
/// Derive it with `#[derive(Configurable)]` or implement [`schema`](Self::schema)
/// by hand.
pub trait Configurable: Send + 'static {
    /// Returns the type's binding specification.
    fn schema() -> ConfigSchema<Self>
    where
        Self: Sized;
}

/// Object-safe access to binding, implemented for every [`Configurable`] type.
pub trait Bind: Send {
    /// Binds configuration into `self`.
    ///
    /// # Errors
    ///
    /// Returns the first required field that could not be satisfied.
    fn bind_config(&mut self, binder: &Binder, defaults: &BindDefaults<'_>) -> Result<(), BindError>;
}

impl<T: Configurable> Bind for T {
    fn bind_config(&mut self, binder: &Binder, defaults: &BindDefaults<'_>) -> Result<(), BindError> {
        binder.bind_with_defaults(self, defaults)
    }
}
