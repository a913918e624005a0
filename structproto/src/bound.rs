//! Binding input onto a record through its registry.

use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use tracing::{debug, trace};

use crate::context::PrototypeContext;
use crate::error::{Error, FieldBindingError, Result};
use crate::field::FieldInfo;
use crate::prototype::Prototype;
use crate::registry::Registry;
use crate::value::Value;
use crate::valuebinder::{FieldSlot, ValueBinder};

/// A named input value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Something that can enumerate `(name, value)` pairs on demand.
pub trait FieldValueSource {
    fn iterate(&self) -> impl Iterator<Item = (&str, &Value)>;
}

/// Input keyed by external field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValueMap(pub HashMap<String, Value>);

impl FieldValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<HashMap<String, Value>> for FieldValueMap {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FieldValueSource for FieldValueMap {
    fn iterate(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: BuildHasher> FieldValueSource for HashMap<String, Value, S> {
    fn iterate(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FieldValueSource for [FieldValue] {
    fn iterate(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().map(|fv| (fv.field.as_str(), &fv.value))
    }
}

impl FieldValueSource for Vec<FieldValue> {
    fn iterate(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.as_slice().iterate()
    }
}

/// An external binder driving a record field by field.
///
/// [`Bound::bind`] calls `init` once, `bind` once per registered field in
/// declaration order, then `deinit` once. Required fields are not checked
/// in this mode; `deinit` is where a binder reports them, typically through
/// [`PrototypeContext::check_if_missing_required_fields`].
pub trait StructBinder<R: Prototype> {
    fn init(&mut self, context: &PrototypeContext<'_, R>) -> Result<()>;

    fn bind(&mut self, field: &FieldInfo, slot: &mut dyn FieldSlot) -> Result<()>;

    fn deinit(&mut self, context: &PrototypeContext<'_, R>) -> Result<()>;
}

/// Adapts a per-field function into a [`StructBinder`].
pub struct FunctionStructBinder<F> {
    mapper: F,
}

impl<F> FunctionStructBinder<F>
where
    F: FnMut(&FieldInfo, &mut dyn FieldSlot) -> Result<()>,
{
    pub fn new(mapper: F) -> Self {
        Self { mapper }
    }
}

impl<R, F> StructBinder<R> for FunctionStructBinder<F>
where
    R: Prototype,
    F: FnMut(&FieldInfo, &mut dyn FieldSlot) -> Result<()>,
{
    fn init(&mut self, _context: &PrototypeContext<'_, R>) -> Result<()> {
        Ok(())
    }

    fn bind(&mut self, field: &FieldInfo, slot: &mut dyn FieldSlot) -> Result<()> {
        (self.mapper)(field, slot)
    }

    fn deinit(&mut self, _context: &PrototypeContext<'_, R>) -> Result<()> {
        Ok(())
    }
}

/// A registry attached to one exclusively borrowed record.
pub struct Bound<'a, R: Prototype> {
    registry: Cow<'a, Registry<R>>,
    target: &'a mut R,
}

fn slot_of<'t, R: Prototype>(target: &'t mut R, field: &FieldInfo) -> &'t mut dyn FieldSlot {
    target.field_mut(field.index()).unwrap_or_else(|| {
        panic!(
            "{} declares field '{}' at ordinal {} but has no slot for it",
            std::any::type_name::<R>(),
            field.id_name(),
            field.index()
        )
    })
}

impl<'a, R: Prototype> Bound<'a, R> {
    pub(crate) fn new(registry: Cow<'a, Registry<R>>, target: &'a mut R) -> Self {
        Self { registry, target }
    }

    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    pub fn target(&self) -> &R {
        &*self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut *self.target
    }

    /// Read-only view for lookups and required-field checks.
    pub fn context(&self) -> PrototypeContext<'_, R> {
        PrototypeContext::new(&self.registry, &*self.target)
    }

    /// Bind a lazy sequence of `(name, value)` pairs.
    ///
    /// Null values and unknown names are skipped. The first coercion failure
    /// stops binding; fields written before it keep their new values. Once
    /// the input is exhausted, the smallest required name that never
    /// received a value is reported as missing.
    pub fn bind_iter<I, K, V>(&mut self, input: I, binder: &dyn ValueBinder) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<Value>,
    {
        let mut required = self.registry.required_fields().clone();

        for (name, value) in input {
            let name = name.as_ref();
            let value: &Value = value.borrow();
            if value.is_null() {
                trace!(field = name, "null value skipped");
                continue;
            }
            let Some(field) = self.registry.lookup(name) else {
                trace!(field = name, "unknown field skipped");
                continue;
            };
            if !binder.accepts(field) {
                trace!(field = name, "field not accepted by binder");
                continue;
            }

            binder
                .bind(slot_of(&mut *self.target, field), value)
                .map_err(|source| FieldBindingError {
                    field: name.to_owned(),
                    value: value.clone(),
                    source,
                })?;
            required.remove(name);
        }

        if let Some(field) = required.first() {
            debug!(field, remaining = required.len(), "missing required field");
            return Err(Error::MissingRequiredField {
                field: field.to_owned(),
            });
        }
        Ok(())
    }

    pub fn bind_map<K, S>(
        &mut self,
        values: &HashMap<K, Value, S>,
        binder: &dyn ValueBinder,
    ) -> Result<()>
    where
        K: AsRef<str>,
    {
        self.bind_iter(values.iter(), binder)
    }

    pub fn bind_fields(&mut self, values: &[FieldValue], binder: &dyn ValueBinder) -> Result<()> {
        self.bind_iter(values.iter().map(|fv| (fv.field.as_str(), &fv.value)), binder)
    }

    pub fn bind_iterator<S>(&mut self, source: &S, binder: &dyn ValueBinder) -> Result<()>
    where
        S: FieldValueSource + ?Sized,
    {
        self.bind_iter(source.iterate(), binder)
    }

    /// Bind owned pairs as they arrive, e.g. from an
    /// [`mpsc::Receiver`](std::sync::mpsc::Receiver) fed by a producer
    /// thread.
    pub fn bind_stream<I>(&mut self, input: I, binder: &dyn ValueBinder) -> Result<()>
    where
        I: IntoIterator<Item = FieldValue>,
    {
        self.bind_iter(input.into_iter().map(|fv| (fv.field, fv.value)), binder)
    }

    /// Drive an external binder over every registered field.
    pub fn bind<B>(&mut self, binder: &mut B) -> Result<()>
    where
        B: StructBinder<R> + ?Sized,
    {
        binder.init(&PrototypeContext::new(&self.registry, &*self.target))?;
        for field in self.registry.fields() {
            binder.bind(field, slot_of(&mut *self.target, field))?;
        }
        binder.deinit(&PrototypeContext::new(&self.registry, &*self.target))
    }

    /// Run `mapper` on every registered field.
    pub fn map<F>(&mut self, mapper: F) -> Result<()>
    where
        F: FnMut(&FieldInfo, &mut dyn FieldSlot) -> Result<()>,
    {
        self.bind(&mut FunctionStructBinder::new(mapper))
    }

    /// Call `visitor` with each registered field's name, slot and metadata.
    pub fn visit<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&str, &mut dyn FieldSlot, &FieldInfo),
    {
        for field in self.registry.fields() {
            visitor(field.name(), slot_of(&mut *self.target, field), field);
        }
    }
}

impl<R: Prototype> fmt::Debug for Bound<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("registry", &*self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDecl;
    use crate::options::ResolveOptions;
    use crate::valuebinder::{ScalarBinder, StringBinder};

    #[derive(Debug, Default)]
    struct Job {
        id: String,
        retries: u8,
        tags: Vec<String>,
    }

    impl Prototype for Job {
        fn fields() -> Vec<FieldDecl> {
            vec![
                FieldDecl::new("id").tags(&[("job", "*ID")]),
                FieldDecl::new("retries").tags(&[("job", "RETRIES")]),
                FieldDecl::new("tags").tags(&[("job", "TAGS")]),
            ]
        }

        fn field(&self, ordinal: usize) -> Option<&dyn FieldSlot> {
            match ordinal {
                0 => Some(&self.id),
                1 => Some(&self.retries),
                2 => Some(&self.tags),
                _ => None,
            }
        }

        fn field_mut(&mut self, ordinal: usize) -> Option<&mut dyn FieldSlot> {
            match ordinal {
                0 => Some(&mut self.id),
                1 => Some(&mut self.retries),
                2 => Some(&mut self.tags),
                _ => None,
            }
        }
    }

    fn registry() -> Registry<Job> {
        Registry::resolve(&ResolveOptions::new().tag_name("job")).unwrap()
    }

    #[test]
    fn test_null_does_not_satisfy_required() {
        let registry = registry();
        let mut job = Job::default();
        let err = registry
            .bind(&mut job)
            .bind_iter([("ID", Value::Null), ("RETRIES", Value::Int(2))], &ScalarBinder)
            .unwrap_err();
        assert_eq!(err.missing_field(), Some("ID"));
        assert_eq!(job.retries, 2);
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let registry = registry();
        let mut job = Job::default();
        registry
            .bind(&mut job)
            .bind_fields(
                &[FieldValue::new("ID", "j-1"), FieldValue::new("OTHER", 5)],
                &ScalarBinder,
            )
            .unwrap();
        assert_eq!(job.id, "j-1");
    }

    #[test]
    fn test_first_failure_stops_without_rollback() {
        let registry = registry();
        let mut job = Job::default();
        let input = vec![
            FieldValue::new("ID", "j-2"),
            FieldValue::new("RETRIES", "lots"),
            FieldValue::new("TAGS", "a,b"),
        ];
        let err = registry
            .bind(&mut job)
            .bind_stream(input, &StringBinder)
            .unwrap_err();
        let Error::FieldBinding(err) = err else {
            panic!("expected field binding error");
        };
        assert_eq!(err.field, "RETRIES");
        assert_eq!(err.value, Value::from("lots"));
        assert_eq!(job.id, "j-2");
        assert!(job.tags.is_empty());
    }

    #[test]
    fn test_bind_iterator_over_map_source() {
        let registry = registry();
        let mut job = Job::default();
        let source: FieldValueMap = [("ID", "x"), ("TAGS", "a,b")].into_iter().collect();
        registry
            .bind(&mut job)
            .bind_iterator(&source, &StringBinder)
            .unwrap();
        assert_eq!(job.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_visit_in_declaration_order() {
        let registry = registry();
        let mut job = Job::default();
        let mut seen = Vec::new();
        registry.bind(&mut job).visit(|name, slot, info| {
            seen.push((name.to_owned(), info.index()));
            if name == "RETRIES" {
                slot.bind_value(&Value::Int(9)).unwrap();
            }
        });
        assert_eq!(
            seen,
            vec![("ID".to_owned(), 0), ("RETRIES".to_owned(), 1), ("TAGS".to_owned(), 2)]
        );
        assert_eq!(job.retries, 9);
    }

    #[test]
    fn test_map_stops_on_error() {
        let registry = registry();
        let mut job = Job::default();
        let mut calls = 0;
        let err = registry
            .bind(&mut job)
            .map(|field, _slot| {
                calls += 1;
                if field.name() == "RETRIES" {
                    Err(Error::binder("stop"))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "stop");
        assert_eq!(calls, 2);
    }

    #[test]
    #[should_panic(expected = "has no slot")]
    fn test_missing_slot_is_a_contract_violation() {
        struct Broken;
        impl Prototype for Broken {
            fn fields() -> Vec<FieldDecl> {
                vec![FieldDecl::new("x")]
            }
            fn field(&self, _: usize) -> Option<&dyn FieldSlot> {
                None
            }
            fn field_mut(&mut self, _: usize) -> Option<&mut dyn FieldSlot> {
                None
            }
        }

        let registry = Registry::<Broken>::resolve(&ResolveOptions::new()).unwrap();
        let mut target = Broken;
        let _ = registry
            .bind(&mut target)
            .bind_iter([("x", Value::Int(1))], &ScalarBinder);
    }
}
