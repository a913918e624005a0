//! Field registry: the resolved, immutable description of a record type.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bound::Bound;
use crate::error::{Error, Result};
use crate::field::FieldInfo;
use crate::flags::FlagSet;
use crate::options::ResolveOptions;
use crate::prototype::Prototype;
use crate::tag::TagResolver;

/// Builds registries according to a set of [`ResolveOptions`].
#[derive(Clone)]
pub struct Resolver {
    tag_name: Option<String>,
    tag_resolver: Arc<dyn TagResolver>,
    check_duplicate_names: bool,
}

impl Resolver {
    pub fn new(options: &ResolveOptions) -> Self {
        Self {
            tag_name: options.get_tag_name().map(str::to_owned),
            tag_resolver: options.effective_resolver(),
            check_duplicate_names: options.is_check_duplicate_names(),
        }
    }

    /// Resolve every declared field of `R`.
    ///
    /// Fields whose tag resolves to nothing are skipped. With duplicate
    /// checking disabled, a later field silently shadows an earlier one of
    /// the same external name; a required flag on the shadowed field still
    /// makes the name required.
    pub fn resolve<R: Prototype>(&self) -> Result<Registry<R>> {
        let decls = R::fields();
        let mut fields: Vec<FieldInfo> = Vec::with_capacity(decls.len());
        let mut required = FlagSet::new();

        for (ordinal, decl) in decls.iter().enumerate() {
            let token = self
                .tag_name
                .as_deref()
                .and_then(|key| decl.tag(key))
                .unwrap_or_default();
            let tag = self
                .tag_resolver
                .resolve(decl.ident, token)
                .map_err(|source| Error::InvalidTag {
                    field: decl.ident.to_owned(),
                    source,
                })?;
            let Some(tag) = tag else {
                trace!(field = decl.ident, "field has no tag, skipped");
                continue;
            };

            if let Some(pos) = fields.iter().position(|f| f.name() == tag.name) {
                if self.check_duplicate_names {
                    return Err(Error::DuplicateName {
                        name: tag.name,
                        field: decl.ident.to_owned(),
                        existing: fields[pos].id_name().to_owned(),
                    });
                }
                trace!(name = %tag.name, field = decl.ident, "field shadows earlier field");
                fields.remove(pos);
            }
            let field = FieldInfo::new(decl, ordinal, tag.name, tag.desc, tag.flags);
            if field.is_required() {
                required.insert(field.name());
            }
            fields.push(field);
        }

        let registry = Registry::from_fields(fields, required);
        debug!(
            prototype = std::any::type_name::<R>(),
            fields = registry.len(),
            required = %registry.required,
            "prototype resolved"
        );
        Ok(registry)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("tag_name", &self.tag_name)
            .field("check_duplicate_names", &self.check_duplicate_names)
            .finish_non_exhaustive()
    }
}

/// The bindable fields of record type `R`.
///
/// Immutable once built; share it behind an [`Arc`] to bind many records
/// concurrently.
pub struct Registry<R> {
    fields: Vec<FieldInfo>,
    name_index: HashMap<String, usize>,
    required: FlagSet,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Prototype> Registry<R> {
    /// Shorthand for `Resolver::new(options).resolve()`.
    pub fn resolve(options: &ResolveOptions) -> Result<Self> {
        Resolver::new(options).resolve()
    }

    /// Attach a target record for binding.
    pub fn bind<'a>(&'a self, target: &'a mut R) -> Bound<'a, R> {
        Bound::new(Cow::Borrowed(self), target)
    }
}

impl<R> Registry<R> {
    fn from_fields(fields: Vec<FieldInfo>, required: FlagSet) -> Self {
        let name_index = fields
            .iter()
            .enumerate()
            .map(|(pos, field)| (field.name().to_owned(), pos))
            .collect();
        Self {
            fields,
            name_index,
            required,
            _marker: PhantomData,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldInfo> {
        self.name_index.get(name).map(|&pos| &self.fields[pos])
    }

    /// Registered fields in declaration order.
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// External names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldInfo::name).collect()
    }

    /// Required external names, sorted.
    pub fn required_fields(&self) -> &FlagSet {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.has(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R> Clone for Registry<R> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            name_index: self.name_index.clone(),
            required: self.required.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("prototype", &std::any::type_name::<R>())
            .field("fields", &self.fields)
            .field("required", &self.required)
            .finish()
    }
}

/// Resolve `R` and attach `target` in one step.
pub fn prototypify<'a, R: Prototype>(
    target: &'a mut R,
    options: &ResolveOptions,
) -> Result<Bound<'a, R>> {
    let registry = Registry::resolve(options)?;
    Ok(Bound::new(Cow::Owned(registry), target))
}
