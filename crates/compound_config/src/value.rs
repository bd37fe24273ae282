//! The native value model of configuration documents and conversion into
//! field types.
//!
//! Documents store [`serde_json::Value`]s. A field type implements
//! [`ConfigType`] to describe how a native value becomes an instance of it.
//! Numeric field types accept any numeric value and narrow or widen it to
//! their exact width, so a stored `8080` binds to an `f64` field as `8080.0`.

use crate::document::ConfigDocument;
use core::any::Any;
use core::fmt;
use serde_json::Value;

/// A type-erased value on its way into a field.
pub type BoundValue = Box<dyn Any + Send>;

/// The kind of a native configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// An explicit null.
    Null,
    /// `true` or `false`.
    Bool,
    /// A whole number.
    Integer,
    /// A number with a fractional part or exponent.
    Float,
    /// Text.
    String,
    /// An ordered sequence.
    List,
    /// A nested mapping.
    Section,
}

impl ValueKind {
    /// Returns the kind of a native value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Section,
        }
    }

    /// Returns true for [`Integer`](Self::Integer) and [`Float`](Self::Float).
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Section => "section",
        };
        f.write_str(name)
    }
}

/// A field type that can be read from a native configuration value.
///
/// # Example
///
/// ```
/// use compound_config::value::ConfigType;
/// use serde_json::json;
///
/// assert_eq!(f64::from_config(&json!(8080)), Some(8080.0));
/// assert_eq!(u8::from_config(&json!(300)), Some(44));
/// assert_eq!(String::from_config(&json!(1)), None);
/// ```
pub trait ConfigType: Sized + Send + 'static {
    /// The kind of native value this type is normally read from.
    const KIND: ValueKind;

    /// Converts a native value, or returns `None` if it is of the wrong kind.
    fn from_config(value: &Value) -> Option<Self>;
}

/// Reads any numeric value as `i64`, truncating fractional parts.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| u as i64))
            .or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigType for $ty {
                const KIND: ValueKind = ValueKind::Integer;

                fn from_config(value: &Value) -> Option<Self> {
                    as_integer(value).map(|n| n as $ty)
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

impl ConfigType for u64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_config(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().or_else(|| as_integer(value).map(|i| i as u64)),
            _ => None,
        }
    }
}

impl ConfigType for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_config(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl ConfigType for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_config(value: &Value) -> Option<Self> {
        value.as_f64().map(|f| f as f32)
    }
}

impl ConfigType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_config(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl ConfigType for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_config(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl ConfigType for char {
    const KIND: ValueKind = ValueKind::String;

    fn from_config(value: &Value) -> Option<Self> {
        let mut chars = value.as_str()?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl<T: ConfigType> ConfigType for Vec<T> {
    const KIND: ValueKind = ValueKind::List;

    fn from_config(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_config).collect()
    }
}

impl ConfigType for Value {
    const KIND: ValueKind = ValueKind::Section;

    fn from_config(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl ConfigType for ConfigDocument {
    const KIND: ValueKind = ValueKind::Section;

    fn from_config(value: &Value) -> Option<Self> {
        value.as_object().cloned().map(ConfigDocument::from_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_of_native_values() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(3)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(3.5)), ValueKind::Float);
        assert_eq!(ValueKind::of(&json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([1])), ValueKind::List);
        assert_eq!(ValueKind::of(&json!({"a": 1})), ValueKind::Section);
    }

    #[test]
    fn integer_widens_to_float() {
        assert_eq!(f64::from_config(&json!(8080)), Some(8080.0));
        assert_eq!(f32::from_config(&json!(2)), Some(2.0));
    }

    #[test]
    fn float_narrows_to_integer() {
        assert_eq!(i32::from_config(&json!(7.9)), Some(7));
        assert_eq!(i64::from_config(&json!(-2.5)), Some(-2));
    }

    #[test]
    fn integers_wrap_like_primitive_casts() {
        assert_eq!(u8::from_config(&json!(300)), Some(44));
        assert_eq!(i8::from_config(&json!(255)), Some(-1));
        assert_eq!(u64::from_config(&json!(u64::MAX)), Some(u64::MAX));
    }

    #[test]
    fn non_numeric_values_are_rejected_for_numbers() {
        assert_eq!(i32::from_config(&json!("8080")), None);
        assert_eq!(f64::from_config(&json!(true)), None);
    }

    #[test]
    fn strings_are_not_coerced() {
        assert_eq!(String::from_config(&json!(12)), None);
        assert_eq!(String::from_config(&json!("x")), Some("x".to_owned()));
    }

    #[test]
    fn char_requires_single_character() {
        assert_eq!(char::from_config(&json!("&")), Some('&'));
        assert_eq!(char::from_config(&json!("ab")), None);
        assert_eq!(char::from_config(&json!("")), None);
    }

    #[test]
    fn lists_convert_every_element() {
        assert_eq!(
            Vec::<u16>::from_config(&json!([1, 2, 3.0])),
            Some(vec![1, 2, 3])
        );
        assert_eq!(Vec::<u16>::from_config(&json!([1, "two"])), None);
    }

    #[test]
    fn sections_become_documents() {
        let doc = ConfigDocument::from_config(&json!({"host": "localhost"}));
        assert!(doc.is_some_and(|d| d.contains("host")));
        assert!(ConfigDocument::from_config(&json!([1])).is_none());
    }
}
