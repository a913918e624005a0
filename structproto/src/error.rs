//! Error types for registration and binding

use thiserror::Error;

use crate::tag::TagError;
use crate::value::Value;
use crate::valuebinder::CoercionError;

/// Result type for registration and binding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by user code: unmarshalers and external binders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A coercion failure attributed to the input field that caused it.
#[derive(Debug, Error)]
#[error("cannot bind field '{field}': {source}")]
pub struct FieldBindingError {
    pub field: String,
    pub value: Value,
    pub source: CoercionError,
}

/// Errors that can occur while registering a record type or binding input
#[derive(Debug, Error)]
pub enum Error {
    /// An input value could not be stored in its field
    #[error(transparent)]
    FieldBinding(#[from] FieldBindingError),

    /// A required field never received a non-null value
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    /// Two fields resolved to the same external name
    #[error("find duplicate name '{name}' on field '{field}' (already used by '{existing}')")]
    DuplicateName {
        name: String,
        field: String,
        existing: String,
    },

    /// A field annotation could not be parsed
    #[error("invalid tag on field '{field}': {source}")]
    InvalidTag { field: String, source: TagError },

    /// Raised by an external binder
    #[error("{0}")]
    Binder(#[source] BoxError),
}

impl Error {
    /// Wrap an external binder's failure.
    pub fn binder(err: impl Into<BoxError>) -> Self {
        Error::Binder(err.into())
    }

    pub fn is_missing_required_field(&self) -> bool {
        matches!(self, Error::MissingRequiredField { .. })
    }

    /// Name of the missing required field, if that is what failed.
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Error::MissingRequiredField { field } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuebinder::{ConvError, Kind};

    #[test]
    fn test_error_display() {
        let err = Error::MissingRequiredField {
            field: "AGE".into(),
        };
        assert_eq!(err.to_string(), "missing required field 'AGE'");
        assert_eq!(err.missing_field(), Some("AGE"));
        assert!(err.is_missing_required_field());
    }

    #[test]
    fn test_field_binding_error() {
        let value = Value::from("x");
        let err: Error = FieldBindingError {
            field: "AGE".into(),
            value: value.clone(),
            source: CoercionError::new(&value, Kind::I32, ConvError::ParseBool("x".into())),
        }
        .into();
        assert!(err.to_string().starts_with("cannot bind field 'AGE': cannot bind i32"));
        assert_eq!(err.missing_field(), None);
    }

    #[test]
    fn test_duplicate_name_display() {
        let err = Error::DuplicateName {
            name: "NAME".into(),
            field: "Alias".into(),
            existing: "Name".into(),
        };
        assert!(err.to_string().contains("'NAME'"));
        assert!(err.to_string().contains("'Alias'"));
    }

    #[test]
    fn test_binder_error() {
        let err = Error::binder("no data source");
        assert_eq!(err.to_string(), "no data source");
    }
}
