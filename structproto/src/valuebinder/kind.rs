use std::fmt;

/// The destination category of a bindable field.
///
/// Reported in every coercion failure so callers can tell what the engine was
/// trying to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    Seq,
    Array,
    Map,
    Option,
    Box,
    Duration,
    Url,
    Time,
    Ip,
    Buffer,
    RawContent,
    RawMessage,
    /// A user type bound through its own unmarshal routine.
    Custom(&'static str),
}

impl Kind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Kind::I8
                | Kind::I16
                | Kind::I32
                | Kind::I64
                | Kind::Isize
                | Kind::U8
                | Kind::U16
                | Kind::U32
                | Kind::U64
                | Kind::Usize
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::F32 | Kind::F64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::String => "string",
            Kind::Seq => "sequence",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Option => "option",
            Kind::Box => "box",
            Kind::Duration => "duration",
            Kind::Url => "url",
            Kind::Time => "time",
            Kind::Ip => "ip",
            Kind::Buffer => "buffer",
            Kind::RawContent => "raw content",
            Kind::RawMessage => "raw message",
            Kind::Custom(name) => name,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
