//! # structproto
//!
//! Binds loosely-typed input values onto the typed fields of a record.
//!
//! A record type describes its fields through [`Prototype`] (usually
//! derived). Resolving it against a [`ResolveOptions`] yields a
//! [`Registry`]: external names, descriptions and flags parsed from each
//! field's annotation. Attaching a target record to the registry gives a
//! [`Bound`], which accepts `(name, value)` pairs from maps, iterators or
//! channels, coerces each value into its field's type and finally checks
//! that every required field was supplied.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use structproto::{prototypify, Prototype, ResolveOptions, ScalarBinder, Value};
//!
//! #[derive(Debug, Default, Prototype)]
//! struct Server {
//!     #[proto(env = "*HOST")]
//!     host: String,
//!     #[proto(env = "PORT;port to listen on")]
//!     port: u16,
//!     #[proto(env = "TAGS")]
//!     tags: Vec<String>,
//! }
//!
//! let input = HashMap::from([
//!     ("HOST".to_string(), Value::from("localhost")),
//!     ("PORT".to_string(), Value::from("8080")),
//!     ("TAGS".to_string(), Value::Seq(vec!["a".into(), "b".into()])),
//! ]);
//!
//! let mut server = Server::default();
//! prototypify(&mut server, &ResolveOptions::new().tag_name("env"))
//!     .unwrap()
//!     .bind_map(&input, &ScalarBinder)
//!     .unwrap();
//!
//! assert_eq!(server.host, "localhost");
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.tags, ["a", "b"]);
//! ```

extern crate self as structproto;

mod bound;
mod context;
pub mod conv;
mod error;
mod field;
mod flags;
mod options;
mod prototype;
mod registry;
mod tag;
mod types;
mod value;
pub mod valuebinder;

pub use bound::{
    Bound, FieldValue, FieldValueMap, FieldValueSource, FunctionStructBinder, StructBinder,
};
pub use context::PrototypeContext;
pub use error::{BoxError, Error, FieldBindingError, Result};
pub use field::{FieldDecl, FieldInfo};
pub use flags::{FlagSet, BLANK_FLAG, REQUIRED_FLAG};
pub use options::{ResolveOptions, TagResolverKind};
pub use prototype::Prototype;
pub use registry::{prototypify, Registry, Resolver};
pub use tag::{NoneTagResolver, StdTagResolver, Tag, TagError, TagResolver};
pub use types::{RawContent, RawMessage};
pub use value::{Opaque, Value};
pub use valuebinder::{
    coerce, coerce_bytes, coerce_text, Bind, BytesBinder, CoercionError, ConvError, FieldSlot,
    IgnoreBinder, Kind, ScalarBinder, StringBinder, Unmarshaler, ValueBinder,
};

// Re-export the derive macro
pub use structproto_macros::Prototype;
