//! Per-field metadata.

use crate::flags::{FlagSet, REQUIRED_FLAG};

/// A field as declared on a record type, before tag resolution.
///
/// `tags` holds the raw annotation tokens keyed by tag name, as written in
/// `#[proto(key = "token")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub ident: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldDecl {
    pub const fn new(ident: &'static str) -> Self {
        Self { ident, tags: &[] }
    }

    pub const fn tags(mut self, tags: &'static [(&'static str, &'static str)]) -> Self {
        self.tags = tags;
        self
    }

    /// Raw token for `key`, if the field carries one.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, token)| *token)
    }
}

/// A bindable field after tag resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    id_name: &'static str,
    name: String,
    desc: String,
    index: usize,
    flags: FlagSet,
    tags: &'static [(&'static str, &'static str)],
}

impl FieldInfo {
    pub(crate) fn new<I, S>(
        decl: &FieldDecl,
        index: usize,
        name: String,
        desc: String,
        flags: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags = flags
            .into_iter()
            .map(Into::into)
            .filter(|flag: &String| !flag.is_empty())
            .collect();
        Self {
            id_name: decl.ident,
            name,
            desc,
            index,
            flags,
            tags: decl.tags,
        }
    }

    /// The field's identifier on the record type.
    pub fn id_name(&self) -> &'static str {
        self.id_name
    }

    /// The external name input uses to address the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// Declaration ordinal; addresses the field's slot.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.has(flag)
    }

    pub fn find_flag(&self, predicate: impl FnMut(&str) -> bool) -> bool {
        self.flags.find(predicate)
    }

    pub fn is_required(&self) -> bool {
        self.has_flag(REQUIRED_FLAG)
    }

    /// Raw annotation token for `key`.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, token)| *token)
    }
}
