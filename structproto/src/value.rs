//! Loosely-typed input values.
//!
//! Every bind operation consumes [`Value`]s: already-decoded, heterogeneous
//! input such as the entries of a JSON object, command-line tokens, or raw
//! byte payloads. A value carries its shape (scalar, sequence, mapping) but
//! not the type of the field it will eventually be written into.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// An already-typed value passed through the input untouched.
///
/// When the destination field has exactly the wrapped type, the value is
/// cloned into it without any conversion.
#[derive(Clone)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Wrap a typed value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Name of the wrapped type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Whether the wrapped value has type `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.type_name).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A decoded input value of unknown destination type.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Seq(Vec<Value>),
    /// Entries in input order. Keys are values too, so any key shape can be
    /// coerced into the destination's key type.
    Map(Vec<(Value, Value)>),
    Opaque(Opaque),
}

impl Value {
    /// Build a byte-buffer value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Build a sequence value from anything convertible into values.
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Build a mapping value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Wrap an already-typed value.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Opaque::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short label of the value's shape, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Opaque(opaque) => opaque.type_name(),
        }
    }

    /// View an opaque value holding a std scalar as the matching variant.
    ///
    /// Values that are not opaque, or whose wrapped type has no variant
    /// counterpart, are returned as-is.
    pub fn latent(&self) -> Cow<'_, Value> {
        let Value::Opaque(opaque) = self else {
            return Cow::Borrowed(self);
        };

        macro_rules! unwrap_as {
            ($($ty:ty => $variant:ident),* $(,)?) => {
                $(
                    if let Some(v) = opaque.downcast_ref::<$ty>() {
                        return Cow::Owned(Value::$variant((*v).into()));
                    }
                )*
            };
        }

        unwrap_as!(
            bool => Bool,
            i8 => Int,
            i16 => Int,
            i32 => Int,
            i64 => Int,
            u8 => Uint,
            u16 => Uint,
            u32 => Uint,
            u64 => Uint,
            f32 => Float,
            f64 => Float,
        );

        if let Some(v) = opaque.downcast_ref::<isize>() {
            return Cow::Owned(Value::Int(*v as i64));
        }
        if let Some(v) = opaque.downcast_ref::<usize>() {
            return Cow::Owned(Value::Uint(*v as u64));
        }
        if let Some(v) = opaque.downcast_ref::<String>() {
            return Cow::Owned(Value::String(v.clone()));
        }
        if let Some(v) = opaque.downcast_ref::<&'static str>() {
            return Cow::Owned(Value::String((*v).to_owned()));
        }
        if let Some(v) = opaque.downcast_ref::<Vec<u8>>() {
            return Cow::Owned(Value::Bytes(v.clone()));
        }
        Cow::Borrowed(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Opaque(opaque) => write!(f, "<{}>", opaque.type_name()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    String => String,
    &str => String,
    Vec<Value> => Seq,
    Opaque => Opaque,
);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    n.as_f64().map_or(Value::Null, Value::Float)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let value = Value::from(json!({"name": "luffy", "age": 19, "tags": ["a", "b"]}));
        let Value::Map(entries) = value else {
            panic!("expected map");
        };
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&(Value::from("age"), Value::Int(19))));
        assert!(entries.contains(&(
            Value::from("tags"),
            Value::Seq(vec![Value::from("a"), Value::from("b")])
        )));
    }

    #[test]
    fn test_from_json_large_unsigned() {
        assert_eq!(Value::from(json!(u64::MAX)), Value::Uint(u64::MAX));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
    }

    #[test]
    fn test_latent_unwraps_std_scalars() {
        assert_eq!(
            *Value::opaque(String::from("foo")).latent(),
            Value::from("foo")
        );
        assert_eq!(*Value::opaque(7u16).latent(), Value::Uint(7));
        assert_eq!(
            *Value::opaque(vec![1u8, 2]).latent(),
            Value::Bytes(vec![1, 2])
        );
    }

    #[test]
    fn test_latent_keeps_unknown_opaque() {
        struct Marker;
        let value = Value::opaque(Marker);
        assert!(matches!(value.latent().as_ref(), Value::Opaque(_)));
    }

    #[test]
    fn test_display() {
        let value = Value::map([("k", Value::seq([1, 2]))]);
        assert_eq!(value.to_string(), "{k: [1, 2]}");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::bytes("raw").to_string(), "raw");
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_opaque_type_name() {
        let value = Value::opaque(std::time::Duration::from_secs(1));
        assert!(value.type_name().ends_with("Duration"));
    }
}
