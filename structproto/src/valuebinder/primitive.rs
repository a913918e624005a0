use super::{Bind, CoercionError, ConvError, Kind};
use crate::conv;
use crate::value::Value;

impl Bind for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        conv::to_bool(value).map_err(|e| CoercionError::new(value, Kind::Bool, e))
    }
}

impl Bind for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        conv::to_string(value).map_err(|e| CoercionError::new(value, Kind::String, e))
    }

    fn from_text(text: &str) -> Result<Self, CoercionError> {
        Ok(text.to_owned())
    }
}

macro_rules! bind_integer {
    ($widen:path => $($ty:ty: $kind:ident),* $(,)?) => {
        $(
            impl Bind for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn from_value(value: &Value) -> Result<Self, CoercionError> {
                    let wide = $widen(value).map_err(|e| CoercionError::new(value, Kind::$kind, e))?;
                    <$ty>::try_from(wide).map_err(|_| {
                        CoercionError::new(
                            value,
                            Kind::$kind,
                            ConvError::OutOfRange {
                                value: wide.to_string(),
                                to: Kind::$kind,
                            },
                        )
                    })
                }
            }
        )*
    };
}

bind_integer!(conv::to_i64 => i8: I8, i16: I16, i32: I32, i64: I64, isize: Isize);
bind_integer!(conv::to_u64 => u8: U8, u16: U16, u32: U32, u64: U64, usize: Usize);

impl Bind for f64 {
    fn kind() -> Kind {
        Kind::F64
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        conv::to_f64(value).map_err(|e| CoercionError::new(value, Kind::F64, e))
    }
}

impl Bind for f32 {
    fn kind() -> Kind {
        Kind::F32
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        let wide = conv::to_f64(value).map_err(|e| CoercionError::new(value, Kind::F32, e))?;
        let narrow = wide as f32;
        if wide.is_finite() && narrow.is_infinite() {
            return Err(CoercionError::new(
                value,
                Kind::F32,
                ConvError::OutOfRange {
                    value: wide.to_string(),
                    to: Kind::F32,
                },
            ));
        }
        Ok(narrow)
    }
}
