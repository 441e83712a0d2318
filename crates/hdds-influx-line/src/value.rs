// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed values carried by record fields and their Line Protocol rendering.

use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{BoxError, FieldFormatError};
use crate::escape::{escape_key, quote_string_field};

/// Opt-in capability for values that render themselves as Line Protocol text.
///
/// The returned text is written verbatim as the field value, so the
/// implementation is responsible for producing protocol-safe output
/// (including any `i`/`u` suffix or quoting).
///
/// An `Err` drops the field from the line; the rest of the record still
/// encodes.
pub trait CustomFieldFormatter: Send + Sync {
    fn to_line_protocol(&self) -> Result<String, BoxError>;
}

/// A value that can be stored in an InfluxDB tag or field.
#[derive(Clone)]
pub enum FieldValue<'a> {
    /// UTF-8 string.
    String(Cow<'a, str>),
    /// 64-bit signed integer (`i` suffix).
    Integer(i64),
    /// 64-bit unsigned integer (`u` suffix).
    Unsigned(u64),
    /// 64-bit floating point.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Point in time.
    Timestamp(DateTime<Utc>),
    /// Value with its own Line Protocol rendering.
    Custom(&'a dyn CustomFieldFormatter),
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(v) => f.debug_tuple("String").field(v).finish(),
            FieldValue::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            FieldValue::Unsigned(v) => f.debug_tuple("Unsigned").field(v).finish(),
            FieldValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            FieldValue::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            FieldValue::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            FieldValue::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl FieldValue<'_> {
    /// Render as a field value.
    ///
    /// - Integer: `42i`
    /// - Unsigned: `42u`
    /// - Float: shortest round-trip text, exponent outside `[1e-4, 1e21)`
    /// - Boolean: `true` / `false`
    /// - String: quoted, inner `\` and `"` escaped
    /// - Timestamp: nanoseconds since epoch as an integer (`...i`)
    /// - Custom: formatter output, verbatim
    ///
    /// `key` is only used to label errors.
    pub fn to_field_text(&self, key: &str) -> Result<String, FieldFormatError> {
        match self {
            FieldValue::String(v) => Ok(quote_string_field(v)),
            FieldValue::Integer(v) => Ok(format!("{}i", v)),
            FieldValue::Unsigned(v) => Ok(format!("{}u", v)),
            FieldValue::Float(v) => format_float(*v).ok_or_else(|| FieldFormatError::NonFiniteFloat {
                field: key.to_string(),
                value: *v,
            }),
            FieldValue::Boolean(v) => Ok(v.to_string()),
            FieldValue::Timestamp(ts) => ts
                .timestamp_nanos_opt()
                .map(|ns| format!("{}i", ns))
                .ok_or_else(|| FieldFormatError::TimestampOutOfRange {
                    field: key.to_string(),
                }),
            FieldValue::Custom(c) => c.to_line_protocol().map_err(|source| FieldFormatError::Custom {
                field: key.to_string(),
                source,
            }),
        }
    }

    /// Render as a tag value: plain text, escaped like a key.
    pub fn to_tag_text(&self, key: &str) -> Result<String, FieldFormatError> {
        self.to_plain_text(key).map(|s| escape_key(&s))
    }

    /// Render as unescaped, unsuffixed text.
    ///
    /// Used for tag values and for a measurement name taken from a field.
    pub fn to_plain_text(&self, key: &str) -> Result<String, FieldFormatError> {
        match self {
            FieldValue::String(v) => Ok(v.to_string()),
            FieldValue::Integer(v) => Ok(v.to_string()),
            FieldValue::Unsigned(v) => Ok(v.to_string()),
            FieldValue::Float(v) => format_float(*v).ok_or_else(|| FieldFormatError::NonFiniteFloat {
                field: key.to_string(),
                value: *v,
            }),
            FieldValue::Boolean(v) => Ok(v.to_string()),
            FieldValue::Timestamp(ts) => Ok(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            FieldValue::Custom(c) => c.to_line_protocol().map_err(|source| FieldFormatError::Custom {
                field: key.to_string(),
                source,
            }),
        }
    }
}

/// Format a float as shortest round-trip decimal text.
///
/// Magnitudes below `1e-4` or at least `1e21` switch to exponent form with a
/// signed two-digit exponent (`1e+21`, `1.5e-07`).
///
/// Returns `None` for NaN and infinities, which Line Protocol cannot carry.
pub(crate) fn format_float(v: f64) -> Option<String> {
    if !v.is_finite() {
        return None;
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e21).contains(&abs) {
        // `{:e}` is shortest round-trip too, but prints `1e21` / `1.5e-7`;
        // normalise to a signed two-digit exponent.
        let sci = format!("{:e}", v);
        let (mantissa, exp) = sci.split_once('e')?;
        let exp: i32 = exp.parse().ok()?;
        let sign = if exp < 0 { '-' } else { '+' };
        return Some(format!("{}e{}{:02}", mantissa, sign, exp.abs()));
    }
    Some(format!("{}", v))
}

/// Conversion of Rust values into [`FieldValue`].
///
/// Implemented for the integer widths, floats, `bool`, strings, `char` and
/// instants. Types with their own rendering implement it by returning
/// [`FieldValue::Custom`]:
///
/// ```
/// use hdds_influx_line::{BoxError, CustomFieldFormatter, FieldValue, ToFieldValue};
///
/// struct Percent(u8);
///
/// impl CustomFieldFormatter for Percent {
///     fn to_line_protocol(&self) -> Result<String, BoxError> {
///         Ok(format!("{}.0", self.0))
///     }
/// }
///
/// impl ToFieldValue for Percent {
///     fn to_field_value(&self) -> FieldValue<'_> {
///         FieldValue::Custom(self)
///     }
/// }
/// ```
pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue<'_>;
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl ToFieldValue for $t {
            fn to_field_value(&self) -> FieldValue<'_> {
                FieldValue::Integer(*self as i64)
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl ToFieldValue for $t {
            fn to_field_value(&self) -> FieldValue<'_> {
                FieldValue::Unsigned(*self as u64)
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl ToFieldValue for f64 {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(*self)
    }
}

impl ToFieldValue for f32 {
    fn to_field_value(&self) -> FieldValue<'_> {
        // Widen through the shortest decimal so 0.1f32 renders as 0.1.
        let widened = self.to_string().parse().unwrap_or(f64::from(*self));
        FieldValue::Float(widened)
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Boolean(*self)
    }
}

impl ToFieldValue for str {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::String(Cow::Borrowed(self))
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::String(Cow::Borrowed(self.as_str()))
    }
}

impl ToFieldValue for Cow<'_, str> {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::String(Cow::Borrowed(self.as_ref()))
    }
}

impl ToFieldValue for char {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::String(Cow::Owned(self.to_string()))
    }
}

impl<Tz: TimeZone> ToFieldValue for DateTime<Tz> {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Timestamp(self.with_timezone(&Utc))
    }
}

impl ToFieldValue for SystemTime {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Timestamp(DateTime::<Utc>::from(*self))
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for &T {
    fn to_field_value(&self) -> FieldValue<'_> {
        (**self).to_field_value()
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for Box<T> {
    fn to_field_value(&self) -> FieldValue<'_> {
        (**self).to_field_value()
    }
}
