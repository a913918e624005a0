//! The registration capability of a bindable record type.

use crate::field::FieldDecl;
use crate::valuebinder::FieldSlot;

/// A record type whose fields can be addressed by ordinal.
///
/// Usually derived:
///
/// ```
/// use structproto::Prototype;
///
/// #[derive(Debug, Default, Prototype)]
/// struct Options {
///     #[proto(demo = "*HOST")]
///     host: String,
///     #[proto(demo = "PORT;listen port")]
///     port: Option<u16>,
///     #[proto(skip)]
///     cache: Vec<u8>,
/// }
///
/// assert_eq!(Options::fields().len(), 2);
/// assert_eq!(Options::fields()[1].tag("demo"), Some("PORT;listen port"));
/// ```
///
/// Ordinals are positions in the list returned by [`fields`](Self::fields);
/// [`field`](Self::field) and [`field_mut`](Self::field_mut) must return a
/// slot for every ordinal in that range.
pub trait Prototype: 'static {
    fn fields() -> Vec<FieldDecl>;

    fn field(&self, ordinal: usize) -> Option<&dyn FieldSlot>;

    fn field_mut(&mut self, ordinal: usize) -> Option<&mut dyn FieldSlot>;
}
