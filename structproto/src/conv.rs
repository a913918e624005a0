//! Best-effort scalar conversions over [`Value`].
//!
//! These are the building blocks the coercion engine uses for primitive
//! destinations and for the duration and timestamp well-known types. Every
//! routine first looks through an opaque std scalar (see [`Value::latent`])
//! and accepts UTF-8 byte buffers wherever it accepts text.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::valuebinder::{ConvError, Kind};
use crate::value::Value;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Naive layouts tried after RFC 3339 and RFC 2822; interpreted as UTC.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn unsupported(value: &Value, to: Kind) -> ConvError {
    ConvError::Unsupported {
        from: value.type_name(),
        to,
    }
}

fn text(bytes: &[u8]) -> Result<&str, ConvError> {
    Ok(std::str::from_utf8(bytes)?)
}

pub fn to_bool(value: &Value) -> Result<bool, ConvError> {
    match &*value.latent() {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Uint(u) => Ok(*u != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::String(s) => parse_bool(s),
        Value::Bytes(b) => parse_bool(text(b)?),
        other => Err(unsupported(other, Kind::Bool)),
    }
}

/// Accepts `1 t T TRUE true True 0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, ConvError> {
    match s.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ConvError::ParseBool(s.to_owned())),
    }
}

pub fn to_string(value: &Value) -> Result<String, ConvError> {
    match &*value.latent() {
        Value::String(s) => Ok(s.clone()),
        Value::Bytes(b) => Ok(text(b)?.to_owned()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Uint(u) => Ok(u.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        other => Err(unsupported(other, Kind::String)),
    }
}

pub fn to_i64(value: &Value) -> Result<i64, ConvError> {
    match &*value.latent() {
        Value::Int(i) => Ok(*i),
        Value::Uint(u) => i64::try_from(*u).map_err(|_| ConvError::OutOfRange {
            value: u.to_string(),
            to: Kind::I64,
        }),
        Value::Float(f) => float_to_i64(*f),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => parse_i64(s),
        Value::Bytes(b) => parse_i64(text(b)?),
        other => Err(unsupported(other, Kind::I64)),
    }
}

fn float_to_i64(f: f64) -> Result<i64, ConvError> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f.trunc() as i64)
    } else {
        Err(ConvError::OutOfRange {
            value: f.to_string(),
            to: Kind::I64,
        })
    }
}

fn parse_i64(s: &str) -> Result<i64, ConvError> {
    let s = s.trim();
    match s.parse::<i64>() {
        Ok(i) => Ok(i),
        Err(err) => match s.parse::<f64>() {
            Ok(f) => float_to_i64(f),
            Err(_) => Err(err.into()),
        },
    }
}

pub fn to_u64(value: &Value) -> Result<u64, ConvError> {
    match &*value.latent() {
        Value::Uint(u) => Ok(*u),
        Value::Int(i) => u64::try_from(*i).map_err(|_| ConvError::OutOfRange {
            value: i.to_string(),
            to: Kind::U64,
        }),
        Value::Float(f) => float_to_u64(*f),
        Value::Bool(b) => Ok(u64::from(*b)),
        Value::String(s) => parse_u64(s),
        Value::Bytes(b) => parse_u64(text(b)?),
        other => Err(unsupported(other, Kind::U64)),
    }
}

fn float_to_u64(f: f64) -> Result<u64, ConvError> {
    if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 {
        Ok(f.trunc() as u64)
    } else {
        Err(ConvError::OutOfRange {
            value: f.to_string(),
            to: Kind::U64,
        })
    }
}

fn parse_u64(s: &str) -> Result<u64, ConvError> {
    let s = s.trim();
    match s.parse::<u64>() {
        Ok(u) => Ok(u),
        Err(err) => match s.parse::<f64>() {
            Ok(f) => float_to_u64(f),
            Err(_) => Err(err.into()),
        },
    }
}

pub fn to_f64(value: &Value) -> Result<f64, ConvError> {
    match &*value.latent() {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::Uint(u) => Ok(*u as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => Ok(s.trim().parse::<f64>()?),
        Value::Bytes(b) => Ok(text(b)?.trim().parse::<f64>()?),
        other => Err(unsupported(other, Kind::F64)),
    }
}

/// Numbers are nanoseconds; text is a duration string or a bare
/// nanosecond count.
pub fn to_duration(value: &Value) -> Result<Duration, ConvError> {
    if let Value::Opaque(opaque) = value {
        if let Some(delta) = opaque.downcast_ref::<TimeDelta>() {
            return delta
                .to_std()
                .map_err(|_| ConvError::Duration(format!("negative duration {delta}")));
        }
    }

    match &*value.latent() {
        Value::Int(i) => u64::try_from(*i)
            .map(Duration::from_nanos)
            .map_err(|_| ConvError::Duration(format!("negative duration {i}ns"))),
        Value::Uint(u) => Ok(Duration::from_nanos(*u)),
        Value::Float(f) if f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 => {
            Ok(Duration::from_nanos(f.trunc() as u64))
        }
        Value::Float(f) => Err(ConvError::Duration(format!("{f}ns out of range"))),
        Value::String(s) => duration_from_text(s),
        Value::Bytes(b) => duration_from_text(text(b)?),
        other => Err(unsupported(other, Kind::Duration)),
    }
}

fn duration_from_text(s: &str) -> Result<Duration, ConvError> {
    let trimmed = s.trim();
    match trimmed.parse::<u64>() {
        Ok(nanos) => Ok(Duration::from_nanos(nanos)),
        Err(_) => parse_duration(trimmed),
    }
}

/// Parse a duration such as `"300ms"`, `"1.5h"` or `"2h45m"`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `"0"`
/// is accepted; negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, ConvError> {
    let invalid = || ConvError::Duration(format!("invalid duration {input:?}"));

    let mut s = input.trim();
    if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    } else if s.starts_with('-') {
        return Err(ConvError::Duration(format!("negative duration {input:?}")));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (int_part, rest) = s.split_at(int_end);
        let (frac_part, rest) = match rest.strip_prefix('.') {
            Some(rest) => {
                let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                rest.split_at(end)
            }
            None => ("", rest),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, rest) = rest.split_at(unit_end);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => {
                return Err(ConvError::Duration(format!(
                    "missing unit in duration {input:?}"
                )))
            }
            _ => {
                return Err(ConvError::Duration(format!(
                    "unknown unit {unit:?} in duration {input:?}"
                )))
            }
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(invalid)?;
        if !frac_part.is_empty() {
            let mut numerator: u128 = 0;
            let mut denominator: u128 = 1;
            for digit in frac_part.bytes().take(18) {
                numerator = numerator * 10 + u128::from(digit - b'0');
                denominator *= 10;
            }
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or_else(invalid)?;
        }
        total = total.checked_add(nanos).ok_or_else(invalid)?;
        s = rest;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Integers are unix seconds; text is parsed by [`parse_time`].
pub fn to_time(value: &Value) -> Result<DateTime<FixedOffset>, ConvError> {
    if let Value::Opaque(opaque) = value {
        if let Some(t) = opaque.downcast_ref::<DateTime<FixedOffset>>() {
            return Ok(*t);
        }
        if let Some(t) = opaque.downcast_ref::<DateTime<Utc>>() {
            return Ok(t.fixed_offset());
        }
        if let Some(t) = opaque.downcast_ref::<NaiveDateTime>() {
            return Ok(t.and_utc().fixed_offset());
        }
        if let Some(t) = opaque.downcast_ref::<SystemTime>() {
            return Ok(DateTime::<Utc>::from(*t).fixed_offset());
        }
    }

    match &*value.latent() {
        Value::Int(secs) => from_unix(*secs, 0),
        Value::Uint(secs) => {
            let secs = i64::try_from(*secs)
                .map_err(|_| ConvError::Timestamp(format!("{secs} out of range")))?;
            from_unix(secs, 0)
        }
        Value::Float(f) if f.is_finite() => {
            let secs = f.floor();
            let nanos = ((f - secs) * 1e9) as u32;
            from_unix(secs as i64, nanos)
        }
        Value::String(s) => parse_time(s),
        Value::Bytes(b) => parse_time(text(b)?),
        other => Err(unsupported(other, Kind::Time)),
    }
}

fn from_unix(secs: i64, nanos: u32) -> Result<DateTime<FixedOffset>, ConvError> {
    DateTime::from_timestamp(secs, nanos)
        .map(|t| t.fixed_offset())
        .ok_or_else(|| ConvError::Timestamp(format!("{secs} out of range")))
}

/// Parse a timestamp in RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS[.f]`,
/// `YYYY-MM-DDTHH:MM:SS[.f]` or `YYYY-MM-DD` form. Layouts without an
/// offset are taken as UTC.
pub fn parse_time(input: &str) -> Result<DateTime<FixedOffset>, ConvError> {
    let s = input.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t);
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Ok(t);
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, layout) {
            return Ok(t.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc().fixed_offset())
        .ok_or_else(|| ConvError::Timestamp(format!("cannot parse {input:?}")))
}
