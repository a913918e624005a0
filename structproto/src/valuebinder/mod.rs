//! The value coercion engine.
//!
//! A destination type opts into binding by implementing [`Bind`], which
//! exposes three entry points differing only in the assumed shape of the
//! source: a heterogeneous [`Value`], a single string, or a byte buffer.
//! [`coerce`] adds the direct-assignability rule on top: an opaque input
//! that already has the destination's exact type is cloned in unchanged.
//!
//! Record fields are reached through the object-safe [`FieldSlot`] view, and
//! a [`ValueBinder`] decides which entry point a given input feeds.

mod container;
mod error;
mod kind;
mod known;
mod primitive;
mod unmarshal;

use std::any::Any;

pub use error::{CoercionError, ConvError};
pub use kind::Kind;
pub use unmarshal::{unmarshal_with, Unmarshaler};

use crate::field::FieldInfo;
use crate::value::Value;

/// A type that can be produced from loosely-typed input.
pub trait Bind: Sized + Clone + 'static {
    /// Label reported in coercion failures.
    fn kind() -> Kind;

    /// Convert an already-decoded value.
    fn from_value(value: &Value) -> Result<Self, CoercionError>;

    /// Convert a single string token.
    fn from_text(text: &str) -> Result<Self, CoercionError> {
        Self::from_value(&Value::String(text.to_owned()))
    }

    /// Convert a byte buffer. Defaults to the text path after UTF-8
    /// validation.
    fn from_bytes(bytes: &[u8]) -> Result<Self, CoercionError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CoercionError::new(&Value::bytes(bytes), Self::kind(), e.into()))?;
        Self::from_text(text)
    }
}

/// Coerce a heterogeneous value into `T`.
pub fn coerce<T: Bind>(value: &Value) -> Result<T, CoercionError> {
    match value {
        Value::Opaque(opaque) => {
            if let Some(exact) = opaque.downcast_ref::<T>() {
                return Ok(exact.clone());
            }
        }
        Value::Null => {
            let kind = T::kind();
            if !matches!(kind, Kind::Option | Kind::Box | Kind::Custom(_)) {
                return Err(CoercionError::new(value, kind, ConvError::Null { to: kind }));
            }
        }
        _ => {}
    }
    T::from_value(value)
}

/// Coerce a string token into `T`.
pub fn coerce_text<T: Bind>(text: &str) -> Result<T, CoercionError> {
    T::from_text(text)
}

/// Coerce a byte buffer into `T`.
pub fn coerce_bytes<T: Bind>(bytes: &[u8]) -> Result<T, CoercionError> {
    T::from_bytes(bytes)
}

/// Object-safe, mutable view of one destination field.
///
/// Every [`Bind`] type is a slot. A failed bind leaves the slot untouched.
pub trait FieldSlot: Any + 'static {
    fn bind_value(&mut self, value: &Value) -> Result<(), CoercionError>;
    fn bind_text(&mut self, text: &str) -> Result<(), CoercionError>;
    fn bind_bytes(&mut self, bytes: &[u8]) -> Result<(), CoercionError>;
    fn field_kind(&self) -> Kind;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Bind> FieldSlot for T {
    fn bind_value(&mut self, value: &Value) -> Result<(), CoercionError> {
        *self = coerce(value)?;
        Ok(())
    }

    fn bind_text(&mut self, text: &str) -> Result<(), CoercionError> {
        *self = coerce_text(text)?;
        Ok(())
    }

    fn bind_bytes(&mut self, bytes: &[u8]) -> Result<(), CoercionError> {
        *self = coerce_bytes(bytes)?;
        Ok(())
    }

    fn field_kind(&self) -> Kind {
        <T as Bind>::kind()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn FieldSlot {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl std::fmt::Debug for dyn FieldSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSlot")
            .field("kind", &self.field_kind())
            .finish_non_exhaustive()
    }
}

/// Feeds one input value into one field slot.
pub trait ValueBinder {
    /// Whether this binder handles `field` at all. A field that is not
    /// accepted is treated like an unknown name.
    fn accepts(&self, _field: &FieldInfo) -> bool {
        true
    }

    fn bind(&self, slot: &mut dyn FieldSlot, value: &Value) -> Result<(), CoercionError>;
}

impl<F> ValueBinder for F
where
    F: Fn(&mut dyn FieldSlot, &Value) -> Result<(), CoercionError>,
{
    fn bind(&self, slot: &mut dyn FieldSlot, value: &Value) -> Result<(), CoercionError> {
        self(slot, value)
    }
}

/// Binds any decoded value through [`Bind::from_value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBinder;

impl ValueBinder for ScalarBinder {
    fn bind(&self, slot: &mut dyn FieldSlot, value: &Value) -> Result<(), CoercionError> {
        slot.bind_value(value)
    }
}

/// Binds string input through [`Bind::from_text`]; sequences are split on
/// commas.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringBinder;

impl ValueBinder for StringBinder {
    fn bind(&self, slot: &mut dyn FieldSlot, value: &Value) -> Result<(), CoercionError> {
        match &*value.latent() {
            Value::String(text) => slot.bind_text(text),
            other => Err(unexpected_input(slot, value, "string", other)),
        }
    }
}

/// Binds byte input through [`Bind::from_bytes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesBinder;

impl ValueBinder for BytesBinder {
    fn bind(&self, slot: &mut dyn FieldSlot, value: &Value) -> Result<(), CoercionError> {
        match &*value.latent() {
            Value::Bytes(bytes) => slot.bind_bytes(bytes),
            other => Err(unexpected_input(slot, value, "bytes", other)),
        }
    }
}

/// Accepts no field; every input pair is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreBinder;

impl ValueBinder for IgnoreBinder {
    fn accepts(&self, _field: &FieldInfo) -> bool {
        false
    }

    fn bind(&self, _slot: &mut dyn FieldSlot, _value: &Value) -> Result<(), CoercionError> {
        Ok(())
    }
}

fn unexpected_input(
    slot: &dyn FieldSlot,
    value: &Value,
    expected: &'static str,
    found: &Value,
) -> CoercionError {
    CoercionError::new(
        value,
        slot.field_kind(),
        ConvError::UnexpectedInput {
            expected,
            found: found.type_name(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_opaque_is_cloned() {
        #[derive(Debug, Clone, PartialEq)]
        struct Point(i32, i32);
        impl Bind for Point {
            fn kind() -> Kind {
                Kind::Custom("Point")
            }
            fn from_value(value: &Value) -> Result<Self, CoercionError> {
                Err(CoercionError::new(
                    value,
                    Self::kind(),
                    ConvError::Unsupported {
                        from: value.type_name(),
                        to: Self::kind(),
                    },
                ))
            }
        }

        let point: Point = coerce(&Value::opaque(Point(1, 2))).unwrap();
        assert_eq!(point, Point(1, 2));
    }

    #[test]
    fn test_null_into_scalar_fails() {
        let err = coerce::<i32>(&Value::Null).unwrap_err();
        assert!(matches!(err.conv_error(), ConvError::Null { to: Kind::I32 }));
        assert_eq!(coerce::<Option<i32>>(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_slot_failure_leaves_value() {
        let mut target = 7u8;
        let slot: &mut dyn FieldSlot = &mut target;
        assert!(slot.bind_text("300").is_err());
        assert_eq!(target, 7);
    }

    #[test]
    fn test_slot_downcast() {
        let mut target = String::from("a");
        let slot: &mut dyn FieldSlot = &mut target;
        slot.bind_value(&Value::Int(5)).unwrap();
        assert_eq!(slot.downcast_ref::<String>().map(String::as_str), Some("5"));
        assert!(slot.downcast_mut::<i32>().is_none());
        assert_eq!(slot.field_kind(), Kind::String);
    }

    #[test]
    fn test_string_binder_requires_string() {
        let mut target = 0i32;
        StringBinder.bind(&mut target, &Value::from("12")).unwrap();
        assert_eq!(target, 12);

        let err = StringBinder.bind(&mut target, &Value::Int(3)).unwrap_err();
        assert!(matches!(
            err.conv_error(),
            ConvError::UnexpectedInput {
                expected: "string",
                found: "int"
            }
        ));
        assert_eq!(target, 12);
    }

    #[test]
    fn test_string_binder_accepts_opaque_string() {
        let mut target: Vec<String> = Vec::new();
        StringBinder
            .bind(&mut target, &Value::opaque(String::from("a,b")))
            .unwrap();
        assert_eq!(target, vec!["a", "b"]);
    }

    #[test]
    fn test_bytes_binder() {
        let mut target = false;
        BytesBinder.bind(&mut target, &Value::bytes("true")).unwrap();
        assert!(target);
        assert!(BytesBinder.bind(&mut target, &Value::from("true")).is_err());
    }

    #[test]
    fn test_closure_binder() {
        let upper = |slot: &mut dyn FieldSlot, value: &Value| {
            slot.bind_text(&value.to_string().to_uppercase())
        };
        let mut target = String::new();
        upper.bind(&mut target, &Value::from("abc")).unwrap();
        assert_eq!(target, "ABC");
    }
}
