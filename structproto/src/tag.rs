//! Field annotation parsing.
//!
//! A [`TagResolver`] turns the raw annotation token attached to a field into
//! a [`Tag`]: the external name, flags and description. Returning `None`
//! marks the field as not bindable.

use thiserror::Error;

use crate::flags::REQUIRED_FLAG;

/// Resolved field metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub flags: Vec<String>,
    pub desc: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }
}

/// Malformed annotation syntax.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("unknown attribute symbol '{0}'")]
    UnknownSymbol(char),
}

/// Resolves a field's annotation token.
pub trait TagResolver: Send + Sync {
    fn resolve(&self, field: &str, token: &str) -> Result<Option<Tag>, TagError>;
}

impl<F> TagResolver for F
where
    F: Fn(&str, &str) -> Result<Option<Tag>, TagError> + Send + Sync,
{
    fn resolve(&self, field: &str, token: &str) -> Result<Option<Tag>, TagError> {
        self(field, token)
    }
}

/// The `name,flag1,flag2;description` syntax.
///
/// Without explicit flags, leading `*` characters on the name each mean
/// [`REQUIRED_FLAG`]. A name of `-` skips the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdTagResolver;

fn is_ident_char(ch: char) -> bool {
    ch == '_' || ch == '-' || ch.is_ascii_alphanumeric()
}

impl TagResolver for StdTagResolver {
    fn resolve(&self, _field: &str, token: &str) -> Result<Option<Tag>, TagError> {
        if token.is_empty() {
            return Ok(None);
        }

        let (head, desc) = token.split_once(';').unwrap_or((token, ""));
        let mut parts = head.split(',');
        let mut name = parts.next().unwrap_or_default();
        let mut flags: Vec<String> = parts.map(str::to_owned).collect();

        if flags.is_empty() {
            let start = name.find(is_ident_char).unwrap_or(name.len());
            for ch in name[..start].chars() {
                match ch {
                    '*' => flags.push(REQUIRED_FLAG.to_owned()),
                    other => return Err(TagError::UnknownSymbol(other)),
                }
            }
            name = &name[start..];
        }

        if name.is_empty() || name == "-" {
            return Ok(None);
        }
        Ok(Some(Tag {
            name: name.to_owned(),
            flags,
            desc: desc.to_owned(),
        }))
    }
}

/// Every field is bindable under its identifier name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneTagResolver;

impl TagResolver for NoneTagResolver {
    fn resolve(&self, field: &str, _token: &str) -> Result<Option<Tag>, TagError> {
        Ok(Some(Tag::new(field)))
    }
}
