//! Read-only view over a registry and its target record.

use crate::error::{Error, Result};
use crate::field::FieldInfo;
use crate::flags::FlagSet;
use crate::prototype::Prototype;
use crate::registry::Registry;
use crate::valuebinder::FieldSlot;

/// Handed to [`StructBinder`](crate::StructBinder)s so they can look up
/// fields and check required-field coverage themselves.
pub struct PrototypeContext<'a, R> {
    registry: &'a Registry<R>,
    target: &'a R,
}

impl<'a, R: Prototype> PrototypeContext<'a, R> {
    pub(crate) fn new(registry: &'a Registry<R>, target: &'a R) -> Self {
        Self { registry, target }
    }

    pub fn target(&self) -> &'a R {
        self.target
    }

    pub fn registry(&self) -> &'a Registry<R> {
        self.registry
    }

    pub fn field_info(&self, name: &str) -> Option<&'a FieldInfo> {
        self.registry.lookup(name)
    }

    /// Current contents of the field registered under `name`.
    pub fn field(&self, name: &str) -> Option<&'a dyn FieldSlot> {
        let info = self.registry.lookup(name)?;
        self.target.field(info.index())
    }

    /// External names in declaration order.
    pub fn field_names(&self) -> Vec<&'a str> {
        self.registry.field_names()
    }

    /// Required external names, sorted.
    pub fn required_fields(&self) -> &'a FlagSet {
        self.registry.required_fields()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.registry.is_required(name)
    }

    /// Fail with the smallest required name absent from `names`.
    ///
    /// `names` is consumed lazily and only until every required name has
    /// been seen.
    pub fn check_if_missing_required_fields<I>(&self, names: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut required = self.registry.required_fields().clone();
        if required.is_empty() {
            return Ok(());
        }
        for name in names {
            required.remove(name.as_ref());
            if required.is_empty() {
                return Ok(());
            }
        }
        match required.first() {
            Some(field) => Err(Error::MissingRequiredField {
                field: field.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

impl<R> Clone for PrototypeContext<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for PrototypeContext<'_, R> {}
