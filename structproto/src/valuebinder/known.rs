//! Converters for recognized composite leaf types.
//!
//! Each converter accepts the already-typed value (handled by
//! [`coerce`](super::coerce)), a byte buffer, a string, or an opaque value
//! whose latent form is one of those.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::{Duration, SystemTime};

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, FixedOffset, Utc};
use url::Url;

use super::{Bind, CoercionError, ConvError, Kind};
use crate::conv;
use crate::types::{RawContent, RawMessage};
use crate::value::Value;

fn unsupported(value: &Value, kind: Kind) -> CoercionError {
    CoercionError::new(
        value,
        kind,
        ConvError::Unsupported {
            from: value.type_name(),
            to: kind,
        },
    )
}

/// Text or UTF-8 bytes, if the value has either form.
fn with_text<T>(
    value: &Value,
    kind: Kind,
    parse: impl FnOnce(&str) -> Result<T, ConvError>,
) -> Result<T, CoercionError> {
    let result = match &*value.latent() {
        Value::String(s) => parse(s),
        Value::Bytes(b) => std::str::from_utf8(b)
            .map_err(ConvError::from)
            .and_then(parse),
        _ => return Err(unsupported(value, kind)),
    };
    result.map_err(|e| CoercionError::new(value, kind, e))
}

impl Bind for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        conv::to_duration(value).map_err(|e| CoercionError::new(value, Kind::Duration, e))
    }
}

impl Bind for Url {
    fn kind() -> Kind {
        Kind::Url
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        with_text(value, Kind::Url, |s| Ok(Url::parse(s.trim())?))
    }
}

impl Bind for DateTime<FixedOffset> {
    fn kind() -> Kind {
        Kind::Time
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        conv::to_time(value).map_err(|e| CoercionError::new(value, Kind::Time, e))
    }
}

impl Bind for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Time
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        DateTime::<FixedOffset>::from_value(value).map(|t| t.with_timezone(&Utc))
    }
}

impl Bind for SystemTime {
    fn kind() -> Kind {
        Kind::Time
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        DateTime::<FixedOffset>::from_value(value).map(SystemTime::from)
    }
}

/// Four bytes are IPv4, sixteen are IPv6.
fn ip_from_raw(bytes: &[u8]) -> Result<IpAddr, ConvError> {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        return Ok(IpAddr::from(octets));
    }
    if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        return Ok(IpAddr::from(octets));
    }
    Err(ConvError::IpLength(bytes.len()))
}

impl Bind for IpAddr {
    fn kind() -> Kind {
        Kind::Ip
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        if let Value::Opaque(opaque) = value {
            if let Some(v4) = opaque.downcast_ref::<Ipv4Addr>() {
                return Ok(IpAddr::V4(*v4));
            }
            if let Some(v6) = opaque.downcast_ref::<Ipv6Addr>() {
                return Ok(IpAddr::V6(*v6));
            }
        }
        let result = match &*value.latent() {
            Value::String(s) => s.trim().parse::<IpAddr>().map_err(ConvError::from),
            Value::Bytes(b) => ip_from_raw(b),
            _ => return Err(unsupported(value, Kind::Ip)),
        };
        result.map_err(|e| CoercionError::new(value, Kind::Ip, e))
    }
}

impl Bind for Ipv4Addr {
    fn kind() -> Kind {
        Kind::Ip
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match IpAddr::from_value(value)? {
            IpAddr::V4(v4) => Ok(v4),
            IpAddr::V6(v6) => v6.to_ipv4_mapped().ok_or_else(|| {
                CoercionError::new(
                    value,
                    Kind::Ip,
                    ConvError::Unsupported {
                        from: "ipv6",
                        to: Kind::Ip,
                    },
                )
            }),
        }
    }
}

impl Bind for Ipv6Addr {
    fn kind() -> Kind {
        Kind::Ip
    }

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match IpAddr::from_value(value)? {
            IpAddr::V4(v4) => Ok(v4.to_ipv6_mapped()),
            IpAddr::V6(v6) => Ok(v6),
        }
    }
}

/// Raw bytes for byte-string destinations: buffers and strings are taken
/// verbatim.
fn raw_bytes(value: &Value, kind: Kind) -> Result<Vec<u8>, CoercionError> {
    if let Value::Opaque(opaque) = value {
        if let Some(b) = opaque.downcast_ref::<Bytes>() {
            return Ok(b.to_vec());
        }
        if let Some(b) = opaque.downcast_ref::<BytesMut>() {
            return Ok(b.to_vec());
        }
    }
    match &*value.latent() {
        Value::Bytes(b) => Ok(b.clone()),
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        _ => Err(unsupported(value, kind)),
    }
}

macro_rules! bind_byte_string {
    ($($ty:ty: $kind:ident => $build:expr),* $(,)?) => {
        $(
            impl Bind for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn from_value(value: &Value) -> Result<Self, CoercionError> {
                    raw_bytes(value, Kind::$kind).map($build)
                }

                fn from_text(text: &str) -> Result<Self, CoercionError> {
                    Ok(($build)(text.as_bytes().to_vec()))
                }

                fn from_bytes(bytes: &[u8]) -> Result<Self, CoercionError> {
                    Ok(($build)(bytes.to_vec()))
                }
            }
        )*
    };
}

bind_byte_string!(
    BytesMut: Buffer => |raw: Vec<u8>| BytesMut::from(&raw[..]),
    Bytes: Buffer => Bytes::from,
    RawContent: RawContent => RawContent,
    RawMessage: RawMessage => RawMessage,
);
