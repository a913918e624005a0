//! Registration options.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::tag::{NoneTagResolver, StdTagResolver, TagResolver};

/// Built-in tag resolvers selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagResolverKind {
    /// `name,flags;description` syntax.
    Std,
    /// Identifier names, annotations ignored.
    None,
}

/// How a record type is turned into a registry.
///
/// Can be built in code or embedded in application configuration:
///
/// ```
/// use structproto::{ResolveOptions, TagResolverKind};
///
/// let options: ResolveOptions = serde_json::from_str(
///     r#"{ "tag_name": "demo", "check_duplicate_names": true }"#,
/// )
/// .unwrap();
/// assert_eq!(options.get_tag_name(), Some("demo"));
///
/// let options = ResolveOptions::new()
///     .tag_name("demo")
///     .resolver(TagResolverKind::Std)
///     .check_duplicate_names(true);
/// assert!(options.is_check_duplicate_names());
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    tag_name: Option<String>,
    resolver: Option<TagResolverKind>,
    check_duplicate_names: bool,
    #[serde(skip)]
    tag_resolver: Option<Arc<dyn TagResolver>>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation key whose tokens are resolved, e.g. `"demo"` for
    /// `#[proto(demo = "...")]`.
    pub fn tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn resolver(mut self, kind: TagResolverKind) -> Self {
        self.resolver = Some(kind);
        self
    }

    /// Use a custom resolver; overrides [`resolver`](Self::resolver).
    pub fn tag_resolver(mut self, resolver: impl TagResolver + 'static) -> Self {
        self.tag_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn check_duplicate_names(mut self, check: bool) -> Self {
        self.check_duplicate_names = check;
        self
    }

    pub fn get_tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn is_check_duplicate_names(&self) -> bool {
        self.check_duplicate_names
    }

    /// The resolver in effect: a custom one if set, then the configured
    /// kind, then [`StdTagResolver`] when a tag name is set and
    /// [`NoneTagResolver`] otherwise.
    pub fn effective_resolver(&self) -> Arc<dyn TagResolver> {
        if let Some(resolver) = &self.tag_resolver {
            return Arc::clone(resolver);
        }
        let kind = self.resolver.unwrap_or(if self.get_tag_name().is_some() {
            TagResolverKind::Std
        } else {
            TagResolverKind::None
        });
        match kind {
            TagResolverKind::Std => Arc::new(StdTagResolver),
            TagResolverKind::None => Arc::new(NoneTagResolver),
        }
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("tag_name", &self.tag_name)
            .field("resolver", &self.resolver)
            .field("check_duplicate_names", &self.check_duplicate_names)
            .field("custom_resolver", &self.tag_resolver.is_some())
            .finish()
    }
}
