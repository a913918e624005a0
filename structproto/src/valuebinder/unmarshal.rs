use super::{Bind, CoercionError, ConvError};
use crate::value::Value;
use crate::BoxError;

/// A user type that decodes itself from any input value.
///
/// Implement this and invoke [`impl_bind_for_unmarshaler!`] to make the type
/// bindable. The unmarshaler sees every entry point: text arrives as
/// [`Value::String`] and byte buffers as [`Value::Bytes`].
///
/// ```
/// use structproto::{impl_bind_for_unmarshaler, BoxError, Unmarshaler, Value};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Celsius(f64);
///
/// impl Unmarshaler for Celsius {
///     fn unmarshal(value: &Value) -> Result<Self, BoxError> {
///         let text = value.to_string();
///         let degrees = text.trim_end_matches('C').parse::<f64>()?;
///         Ok(Celsius(degrees))
///     }
/// }
///
/// impl_bind_for_unmarshaler!(Celsius);
///
/// let t: Celsius = structproto::coerce_text("21.5C").unwrap();
/// assert_eq!(t, Celsius(21.5));
/// ```
pub trait Unmarshaler: Sized {
    fn unmarshal(value: &Value) -> Result<Self, BoxError>;
}

/// Run `T`'s unmarshaler, attributing failures to `T`.
pub fn unmarshal_with<T: Unmarshaler + Bind>(value: &Value) -> Result<T, CoercionError> {
    T::unmarshal(value).map_err(|e| CoercionError::new(value, T::kind(), ConvError::Custom(e)))
}

/// Implement [`Bind`](crate::Bind) for types that implement
/// [`Unmarshaler`](crate::Unmarshaler).
#[macro_export]
macro_rules! impl_bind_for_unmarshaler {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Bind for $ty {
                fn kind() -> $crate::Kind {
                    $crate::Kind::Custom(stringify!($ty))
                }

                fn from_value(
                    value: &$crate::Value,
                ) -> ::std::result::Result<Self, $crate::CoercionError> {
                    $crate::valuebinder::unmarshal_with::<Self>(value)
                }

                fn from_bytes(
                    bytes: &[u8],
                ) -> ::std::result::Result<Self, $crate::CoercionError> {
                    $crate::valuebinder::unmarshal_with::<Self>(&$crate::Value::bytes(bytes))
                }
            }
        )+
    };
}
