//! Parsers for single lines of a `.osu` file.
//!
//! Every function here looks at one trimmed line and either returns the parsed record or a
//! [`FieldError`] describing why the line has to be skipped.

use std::str::FromStr;

use thiserror::Error;

use super::model::{HitObject, TimingPoint};

/// Why a single line could not be read.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldError {
    /// A `key: value` line without the colon.
    #[error("expected `key: value`")]
    MissingSeparator,
    /// A CSV line with too few fields.
    #[error("expected at least {expected} comma-separated fields, found {found}")]
    TooFewFields {
        /// Required field count.
        expected: usize,
        /// Actual field count.
        found: usize,
    },
    /// A field which must be numeric was not.
    #[error("`{name}` is not a valid number: {value:?}")]
    NotANumber {
        /// The field name.
        name: &'static str,
        /// The raw text.
        value: String,
    },
    /// An uninherited timing point whose beat length is zero, negative or not finite.
    #[error("tempo point beat length must be positive, found {value:?}")]
    NonPositiveBeatLength {
        /// The raw text.
        value: String,
    },
}

/// Splits `key: value` on the first colon, trimming both sides.
///
/// # Errors
///
/// Returns [`FieldError::MissingSeparator`] if there is no colon.
pub fn split_key_value(line: &str) -> Result<(&str, &str), FieldError> {
    line.split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or(FieldError::MissingSeparator)
}

/// Parses a numeric field, rejecting non-finite floats.
///
/// # Errors
///
/// Returns [`FieldError::NotANumber`] when `value` does not parse.
pub fn parse_number<T: FromStr + IsFinite>(name: &'static str, value: &str) -> Result<T, FieldError> {
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(IsFinite::is_finite)
        .ok_or_else(|| FieldError::NotANumber {
            name,
            value: value.to_string(),
        })
}

/// Finiteness check for numbers read from chart text, always true for integers.
pub trait IsFinite {
    /// Whether the value is usable.
    fn is_finite(&self) -> bool;
}

impl IsFinite for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

macro_rules! always_finite {
    ($($ty:ty),*) => {
        $(impl IsFinite for $ty {
            fn is_finite(&self) -> bool {
                true
            }
        })*
    };
}

always_finite!(i32, u32, i64);

/// Parses an optional trailing field: missing or empty means `default`.
fn optional_field<T: FromStr + IsFinite>(
    parts: &[&str],
    index: usize,
    name: &'static str,
    default: T,
) -> Result<T, FieldError> {
    match parts.get(index).map(|part| part.trim()) {
        None | Some("") => Ok(default),
        Some(value) => parse_number(name, value),
    }
}

/// Parses `time,beatLength,meter,sampleSet,sampleIndex,volume,uninherited,effects`.
///
/// Only the first two fields are required. A point is uninherited when it has at most six
/// fields or its seventh field is `1`. The beat length of inherited points is not validated,
/// since it carries a slider velocity rather than a tempo.
///
/// # Errors
///
/// Returns [`FieldError`] when a present field is malformed or a tempo point has no positive beat
/// length.
pub fn parse_timing_point(line: &str) -> Result<TimingPoint, FieldError> {
    let parts: Vec<&str> = line.split(',').collect();
    let [time, beat_length, ..] = parts.as_slice() else {
        return Err(FieldError::TooFewFields {
            expected: 2,
            found: parts.len(),
        });
    };
    let time_ms = parse_number("time", time)?;
    let beat_length_value: f64 = parse_number("beatLength", beat_length)?;
    let uninherited = parts.get(6).is_none_or(|flag| flag.trim() == "1");

    let point = TimingPoint {
        time_ms,
        beat_length: beat_length_value,
        meter: optional_field(&parts, 2, "meter", 4)?,
        sample_set: optional_field(&parts, 3, "sampleSet", 0)?,
        sample_index: optional_field(&parts, 4, "sampleIndex", 0)?,
        volume: optional_field(&parts, 5, "volume", 100)?,
        uninherited,
        effects: optional_field(&parts, 7, "effects", 0)?,
    };
    if uninherited && point.bpm().is_none() {
        return Err(FieldError::NonPositiveBeatLength {
            value: beat_length.trim().to_string(),
        });
    }
    Ok(point)
}

/// Parses `x,y,time,type,hitSound[,endTime:extras]`.
///
/// For holds, the end time is the text before the first `:` of the sixth field. A missing or
/// unreadable end time leaves [`HitObject::end_time_ms`] empty, which makes the object a tap.
///
/// # Errors
///
/// Returns [`FieldError`] when one of the five required fields is missing or malformed.
pub fn parse_hit_object(line: &str) -> Result<HitObject, FieldError> {
    let parts: Vec<&str> = line.split(',').collect();
    let [x, y, time, type_flags, hit_sound, rest @ ..] = parts.as_slice() else {
        return Err(FieldError::TooFewFields {
            expected: 5,
            found: parts.len(),
        });
    };
    let mut object = HitObject {
        x: parse_number("x", x)?,
        y: parse_number("y", y)?,
        time_ms: parse_number("time", time)?,
        type_flags: parse_number("type", type_flags)?,
        hit_sound: parse_number("hitSound", hit_sound)?,
        end_time_ms: None,
    };
    if object.is_hold() {
        object.end_time_ms = rest
            .first()
            .and_then(|extras| extras.split(':').next())
            .and_then(|end| parse_number::<f64>("endTime", end).ok());
    }
    Ok(object)
}
