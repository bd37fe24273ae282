//! Resolvers: single-argument transforms from a raw configuration value to a
//! domain type.
//!
//! A field bound through a resolver does not need its type to implement
//! [`ConfigType`]. The binder reads the raw value as the resolver's
//! [`Input`](Resolver::Input), hands it to [`Resolver::apply`] and assigns the
//! result.
//!
//! # Example
//!
//! ```
//! use compound_config::error::ResolveError;
//! use compound_config::resolver::{Resolver, ResolverSpec};
//!
//! #[derive(Debug, PartialEq)]
//! struct Millis(u64);
//!
//! #[derive(Default)]
//! struct Seconds;
//!
//! impl Resolver for Seconds {
//!     type Input = f64;
//!     type Output = Millis;
//!
//!     fn apply(&self, secs: f64) -> Result<Millis, ResolveError> {
//!         if secs < 0.0 {
//!             return Err(ResolveError::rejected("negative duration"));
//!         }
//!         Ok(Millis((secs * 1000.0) as u64))
//!     }
//! }
//!
//! let spec = ResolverSpec::of::<Seconds>();
//! assert!(spec.produces::<Millis>());
//! ```

use crate::error::ResolveError;
use crate::value::{BoundValue, ConfigType, ValueKind};
use core::any::{Any, TypeId};
use core::fmt;
use serde_json::Value;
use std::sync::Arc;

/// A transform from a raw configuration value to a field's type.
pub trait Resolver: Send + Sync + 'static {
    /// The type the raw value is read as.
    type Input: ConfigType;

    /// The type assigned to the field.
    type Output: Any + Send;

    /// Transforms the input.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if the value cannot be transformed.
    fn apply(&self, input: Self::Input) -> Result<Self::Output, ResolveError>;
}

/// A resolver with its input and output types erased.
pub trait ErasedResolver: Send + Sync {
    /// Reads `raw` as the resolver's input and applies the transform.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidInput`] if `raw` has the wrong kind, or
    /// whatever the resolver itself returns.
    fn resolve(&self, raw: &Value) -> Result<BoundValue, ResolveError>;
}

struct Erased<R>(R);

impl<R: Resolver> ErasedResolver for Erased<R> {
    fn resolve(&self, raw: &Value) -> Result<BoundValue, ResolveError> {
        let input = R::Input::from_config(raw).ok_or(ResolveError::InvalidInput {
            expected: R::Input::KIND,
            found: ValueKind::of(raw),
        })?;
        let output = self.0.apply(input)?;
        Ok(Box::new(output))
    }
}

type ResolverFactory = Arc<dyn Fn() -> Result<Box<dyn ErasedResolver>, ResolveError> + Send + Sync>;

/// Declares which resolver a field binds through.
///
/// Records the resolver's declared input and output types so the binder can
/// check them before instantiating the resolver, and a factory that
/// instantiates it once per bound field.
#[derive(Clone)]
pub struct ResolverSpec {
    name: &'static str,
    input_kind: ValueKind,
    input_name: &'static str,
    accepts: fn(&Value) -> bool,
    output: TypeId,
    output_name: &'static str,
    factory: ResolverFactory,
}

impl fmt::Debug for ResolverSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverSpec")
            .field("name", &self.name)
            .field("input", &self.input_name)
            .field("output", &self.output_name)
            .finish_non_exhaustive()
    }
}

fn accepts<V: ConfigType>(raw: &Value) -> bool {
    V::from_config(raw).is_some()
}

impl ResolverSpec {
    /// Describes a resolver built with [`Default`].
    #[must_use]
    pub fn of<R: Resolver + Default>() -> Self {
        Self::with_factory(|| Ok(R::default()))
    }

    /// Describes a resolver built by a fallible factory.
    #[must_use]
    pub fn with_factory<R, F>(factory: F) -> Self
    where
        R: Resolver,
        F: Fn() -> Result<R, ResolveError> + Send + Sync + 'static,
    {
        Self {
            name: core::any::type_name::<R>(),
            input_kind: R::Input::KIND,
            input_name: core::any::type_name::<R::Input>(),
            accepts: accepts::<R::Input>,
            output: TypeId::of::<R::Output>(),
            output_name: core::any::type_name::<R::Output>(),
            factory: Arc::new(move || {
                factory().map(|resolver| Box::new(Erased(resolver)) as Box<dyn ErasedResolver>)
            }),
        }
    }

    /// Returns the resolver's type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the kind of raw value the resolver reads.
    #[must_use]
    pub fn input_kind(&self) -> ValueKind {
        self.input_kind
    }

    /// Returns the `TypeId` of the resolver's output.
    #[must_use]
    pub fn output_type_id(&self) -> TypeId {
        self.output
    }

    /// Returns the type name of the resolver's output.
    #[must_use]
    pub fn output_name(&self) -> &'static str {
        self.output_name
    }

    /// Returns true if the resolver produces values of type `T`.
    #[must_use]
    pub fn produces<T: Any>(&self) -> bool {
        self.output == TypeId::of::<T>()
    }

    /// Returns true if `raw` can be read as the resolver's input.
    #[must_use]
    pub fn accepts(&self, raw: &Value) -> bool {
        (self.accepts)(raw)
    }

    /// Instantiates the resolver.
    ///
    /// # Errors
    ///
    /// Returns whatever the factory returns.
    pub fn instantiate(&self) -> Result<Box<dyn ErasedResolver>, ResolveError> {
        (self.factory)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Upper(String);

    #[derive(Default)]
    struct Shout;

    impl Resolver for Shout {
        type Input = String;
        type Output = Upper;

        fn apply(&self, input: String) -> Result<Upper, ResolveError> {
            if input.is_empty() {
                return Err(ResolveError::rejected("empty"));
            }
            Ok(Upper(input.to_uppercase()))
        }
    }

    #[test]
    fn spec_records_declared_types() {
        let spec = ResolverSpec::of::<Shout>();
        assert!(spec.produces::<Upper>());
        assert!(!spec.produces::<String>());
        assert_eq!(spec.input_kind(), ValueKind::String);
        assert!(spec.name().contains("Shout"));
    }

    #[test]
    fn accepts_checks_input_kind() {
        let spec = ResolverSpec::of::<Shout>();
        assert!(spec.accepts(&json!("hi")));
        assert!(!spec.accepts(&json!(3)));
    }

    #[test]
    fn resolve_applies_transform() {
        let resolver = ResolverSpec::of::<Shout>().instantiate().unwrap();
        let value = resolver.resolve(&json!("hi")).unwrap();
        assert_eq!(value.downcast_ref::<Upper>(), Some(&Upper("HI".into())));
    }

    #[test]
    fn resolve_rejects_wrong_input() {
        let resolver = ResolverSpec::of::<Shout>().instantiate().unwrap();
        let err = resolver.resolve(&json!(1)).err().unwrap();
        assert_eq!(
            err,
            ResolveError::InvalidInput {
                expected: ValueKind::String,
                found: ValueKind::Integer,
            }
        );
    }

    #[test]
    fn failing_factory_surfaces_error() {
        let spec =
            ResolverSpec::with_factory::<Shout, _>(|| Err(ResolveError::instantiate("no palette")));
        let err = spec.instantiate().err().unwrap();
        assert_eq!(err, ResolveError::Instantiate("no palette".into()));
    }
}
