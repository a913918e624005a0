use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use super::{coerce, Bind, CoercionError, ConvError, Kind};
use crate::value::Value;

/// Separator for sequence destinations fed from a single string.
const SEQ_SEPARATOR: char = ',';

impl<T: Bind> Bind for Option<T> {
    fn kind() -> Kind {
        Kind::Option
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::Null => Ok(None),
            _ => coerce::<T>(value).map(Some),
        }
    }

    fn from_text(text: &str) -> Result<Self, CoercionError> {
        T::from_text(text).map(Some)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CoercionError> {
        T::from_bytes(bytes).map(Some)
    }
}

impl<T: Bind> Bind for Box<T> {
    fn kind() -> Kind {
        Kind::Box
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        coerce::<T>(value).map(Box::new)
    }

    fn from_text(text: &str) -> Result<Self, CoercionError> {
        T::from_text(text).map(Box::new)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CoercionError> {
        T::from_bytes(bytes).map(Box::new)
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn kind() -> Kind {
        Kind::Seq
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::Seq(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    coerce::<T>(item)
                        .map_err(|source| CoercionError::slice(value, Kind::Seq, index, source))
                })
                .collect(),
            Value::Bytes(bytes) => vec_from_raw(value, bytes),
            Value::Opaque(_) => match value.latent() {
                Cow::Owned(latent) => Self::from_value(&latent),
                Cow::Borrowed(_) => Err(not_a_sequence(value)),
            },
            _ => Err(not_a_sequence(value)),
        }
    }

    fn from_text(text: &str) -> Result<Self, CoercionError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        text.split(SEQ_SEPARATOR)
            .enumerate()
            .map(|(index, elem)| {
                T::from_text(elem).map_err(|source| {
                    CoercionError::slice(&Value::from(text), Kind::Seq, index, source)
                })
            })
            .collect()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CoercionError> {
        if let Some(raw) = as_byte_vec::<T>(bytes) {
            return Ok(raw);
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CoercionError::new(&Value::bytes(bytes), Kind::Seq, e.into()))?;
        Self::from_text(text)
    }
}

/// A byte buffer is a `Vec<u8>` as-is; any other element type takes each
/// byte as an unsigned integer.
fn vec_from_raw<T: Bind>(value: &Value, bytes: &[u8]) -> Result<Vec<T>, CoercionError> {
    if let Some(raw) = as_byte_vec::<T>(bytes) {
        return Ok(raw);
    }
    bytes
        .iter()
        .enumerate()
        .map(|(index, byte)| {
            coerce::<T>(&Value::Uint(u64::from(*byte)))
                .map_err(|source| CoercionError::slice(value, Kind::Seq, index, source))
        })
        .collect()
}

fn as_byte_vec<T: 'static>(bytes: &[u8]) -> Option<Vec<T>> {
    let raw: Box<dyn Any> = Box::new(bytes.to_vec());
    raw.downcast::<Vec<T>>().ok().map(|v| *v)
}

fn not_a_sequence(value: &Value) -> CoercionError {
    CoercionError::new(
        value,
        Kind::Seq,
        ConvError::UnexpectedInput {
            expected: "sequence",
            found: value.type_name(),
        },
    )
}

impl<T: Bind, const N: usize> Bind for [T; N] {
    fn kind() -> Kind {
        Kind::Array
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        into_array(value, Vec::<T>::from_value(value)?)
    }

    fn from_text(text: &str) -> Result<Self, CoercionError> {
        into_array(&Value::from(text), Vec::<T>::from_text(text)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CoercionError> {
        into_array(&Value::bytes(bytes), Vec::<T>::from_bytes(bytes)?)
    }
}

fn into_array<T, const N: usize>(value: &Value, items: Vec<T>) -> Result<[T; N], CoercionError> {
    let found = items.len();
    items.try_into().map_err(|_| {
        CoercionError::new(value, Kind::Array, ConvError::Length { expected: N, found })
    })
}

/// Build a mapping entry by entry. The first failing key or value aborts
/// the whole conversion.
fn collect_map<K, V, M>(value: &Value) -> Result<M, CoercionError>
where
    K: Bind,
    V: Bind,
    M: FromIterator<(K, V)>,
{
    match value {
        Value::Map(entries) => entries
            .iter()
            .map(|(k, v)| Ok::<_, CoercionError>((coerce::<K>(k)?, coerce::<V>(v)?)))
            .collect(),
        _ => Err(CoercionError::new(
            value,
            Kind::Map,
            ConvError::UnexpectedInput {
                expected: "map",
                found: value.type_name(),
            },
        )),
    }
}

impl<K, V, S> Bind for HashMap<K, V, S>
where
    K: Bind + Eq + Hash,
    V: Bind,
    S: BuildHasher + Default + Clone + 'static,
{
    fn kind() -> Kind {
        Kind::Map
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        collect_map(value)
    }
}

impl<K: Bind + Ord, V: Bind> Bind for BTreeMap<K, V> {
    fn kind() -> Kind {
        Kind::Map
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        collect_map(value)
    }
}

impl<K, V, S> Bind for IndexMap<K, V, S>
where
    K: Bind + Eq + Hash,
    V: Bind,
    S: BuildHasher + Default + Clone + 'static,
{
    fn kind() -> Kind {
        Kind::Map
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        collect_map(value)
    }
}
