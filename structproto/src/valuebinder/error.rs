//! Coercion failures.

use std::fmt;
use std::net::AddrParseError;
use std::num::{ParseFloatError, ParseIntError};
use std::str::Utf8Error;

use thiserror::Error;

use super::Kind;
use crate::value::Value;
use crate::BoxError;

/// Rendered values longer than this are truncated in error messages.
const PREVIEW_LIMIT: usize = 24;

/// Failure of a single conversion step, before it is attributed to a
/// destination.
#[derive(Debug, Error)]
pub enum ConvError {
    #[error("unsupported conversion from {from} to {to}")]
    Unsupported { from: &'static str, to: Kind },

    #[error("expected {expected} input, found {found}")]
    UnexpectedInput {
        expected: &'static str,
        found: &'static str,
    },

    #[error("null cannot be stored in {to}")]
    Null { to: Kind },

    #[error("invalid boolean: {0:?}")]
    ParseBool(String),

    #[error(transparent)]
    ParseInt(#[from] ParseIntError),

    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),

    #[error("value {value} out of range for {to}")]
    OutOfRange { value: String, to: Kind },

    #[error("invalid duration: {0}")]
    Duration(String),

    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Ip(#[from] AddrParseError),

    #[error("invalid IP address length {0}")]
    IpLength(usize),

    #[error(transparent)]
    Utf8(#[from] Utf8Error),

    #[error("expected {expected} elements, found {found}")]
    Length { expected: usize, found: usize },

    #[error("{0}")]
    Custom(#[source] BoxError),
}

/// Display adapter that truncates long values.
struct Preview<'a>(&'a Value);

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.0.to_string();
        match rendered.char_indices().nth(PREVIEW_LIMIT) {
            Some((cut, _)) => write!(f, "{}...", &rendered[..cut]),
            None => f.write_str(&rendered),
        }
    }
}

/// A value could not be stored in its destination.
#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("cannot bind {kind} with value ({}) '{}': {source}", .value.type_name(), Preview(.value))]
    Value {
        value: Value,
        kind: Kind,
        source: ConvError,
    },

    #[error("cannot bind {kind} with value ({}) '{}' at index {index}: {source}", .value.type_name(), Preview(.value))]
    Slice {
        value: Value,
        kind: Kind,
        index: usize,
        source: Box<CoercionError>,
    },
}

impl CoercionError {
    pub fn new(value: &Value, kind: Kind, source: ConvError) -> Self {
        CoercionError::Value {
            value: value.clone(),
            kind,
            source,
        }
    }

    pub(crate) fn slice(value: &Value, kind: Kind, index: usize, source: CoercionError) -> Self {
        CoercionError::Slice {
            value: value.clone(),
            kind,
            index,
            source: Box::new(source),
        }
    }

    /// The full, untruncated input value.
    pub fn value(&self) -> &Value {
        match self {
            CoercionError::Value { value, .. } | CoercionError::Slice { value, .. } => value,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            CoercionError::Value { kind, .. } | CoercionError::Slice { kind, .. } => *kind,
        }
    }

    /// Element index, when the failure happened inside a sequence.
    pub fn index(&self) -> Option<usize> {
        match self {
            CoercionError::Slice { index, .. } => Some(*index),
            CoercionError::Value { .. } => None,
        }
    }

    /// The innermost conversion failure.
    pub fn conv_error(&self) -> &ConvError {
        match self {
            CoercionError::Value { source, .. } => source,
            CoercionError::Slice { source, .. } => source.conv_error(),
        }
    }
}
