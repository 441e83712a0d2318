// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Duration field values.
//!
//! [`ScaledDuration`] holds a duration as text (`"39m47.276156216s"`,
//! `"12µs"`, `"-1.5h"`) together with the unit it should be written in.
//! Small units are written as integer counts, large units as floats with two
//! decimals:
//!
//! | Unit | Output for `"1m17.276156216s"` |
//! |---|---|
//! | ns | `77276156216i` |
//! | us | `77276156i` |
//! | ms | `77276i` |
//! | s | `77.28` |
//! | m | `1.29` |
//! | h | `0.02` |
//! | none | `1m17.276156216s` (unchanged) |

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BoxError;
use crate::value::{CustomFieldFormatter, FieldValue, ToFieldValue};

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Duration text parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration \"{input}\"")]
    Invalid { input: String },

    #[error("missing unit in duration \"{input}\"")]
    MissingUnit { input: String },

    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit { unit: String, input: String },

    #[error("duration \"{input}\" overflows 64-bit nanoseconds")]
    Overflow { input: String },
}

/// Unit a duration is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    #[serde(rename = "ns")]
    Nanosecond,
    #[serde(rename = "us", alias = "µs", alias = "μs")]
    Microsecond,
    #[serde(rename = "ms")]
    Millisecond,
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "m")]
    Minute,
    #[serde(rename = "h")]
    Hour,
}

impl DurationUnit {
    fn nanos(self) -> u64 {
        match self {
            DurationUnit::Nanosecond => NANOSECOND,
            DurationUnit::Microsecond => MICROSECOND,
            DurationUnit::Millisecond => MILLISECOND,
            DurationUnit::Second => SECOND,
            DurationUnit::Minute => MINUTE,
            DurationUnit::Hour => HOUR,
        }
    }
}

/// A textual duration rendered in a chosen unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledDuration {
    /// Duration text, e.g. `"1h15m30.5s"`.
    pub value: String,
    /// Output unit; `None` writes `value` unchanged.
    pub to: Option<DurationUnit>,
}

impl ScaledDuration {
    pub fn new(value: impl Into<String>, to: Option<DurationUnit>) -> Self {
        Self {
            value: value.into(),
            to,
        }
    }

    /// Render the duration in its target unit.
    pub fn render(&self) -> Result<String, DurationError> {
        let ns = parse_nanos(&self.value)?;
        let Some(unit) = self.to else {
            return Ok(self.value.clone());
        };
        let text = match unit {
            DurationUnit::Nanosecond | DurationUnit::Microsecond | DurationUnit::Millisecond => {
                format!("{}i", ns / unit.nanos() as i64)
            }
            DurationUnit::Second | DurationUnit::Minute | DurationUnit::Hour => {
                format!("{:.2}", in_unit(ns, unit.nanos()))
            }
        };
        Ok(text)
    }
}

impl CustomFieldFormatter for ScaledDuration {
    fn to_line_protocol(&self) -> Result<String, BoxError> {
        Ok(self.render()?)
    }
}

impl ToFieldValue for ScaledDuration {
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Custom(self)
    }
}

/// Whole units plus the fractional remainder, without losing precision on
/// the integer part.
fn in_unit(ns: i64, unit: u64) -> f64 {
    let unit = unit as i64;
    let whole = ns / unit;
    let rem = ns % unit;
    whole as f64 + rem as f64 / unit as f64
}

/// Parse duration text such as `"300ms"`, `"-1.5h"` or `"2h45m"`.
///
/// Units: `ns`, `us` (`µs`, `μs`), `ms`, `s`, `m`, `h`. A bare `"0"` is
/// accepted without a unit.
pub fn parse_duration(s: &str) -> Result<TimeDelta, DurationError> {
    parse_nanos(s).map(TimeDelta::nanoseconds)
}

fn parse_nanos(input: &str) -> Result<i64, DurationError> {
    let invalid = || DurationError::Invalid {
        input: input.to_string(),
    };
    let overflow = || DurationError::Overflow {
        input: input.to_string(),
    };

    let mut rest = input;
    let mut negative = false;
    if let Some(r) = rest.strip_prefix('-') {
        negative = true;
        rest = r;
    } else if let Some(r) = rest.strip_prefix('+') {
        rest = r;
    }

    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        // Integer part.
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);
        let whole = leading_int(int_digits).ok_or_else(overflow)?;
        rest = after_int;

        // Fractional part; digits beyond u64 precision are ignored.
        let mut frac: u64 = 0;
        let mut scale: f64 = 1.0;
        let mut frac_len = 0;
        if let Some(r) = rest.strip_prefix('.') {
            frac_len = r.bytes().take_while(u8::is_ascii_digit).count();
            let (frac_digits, after_frac) = r.split_at(frac_len);
            let mut truncated = false;
            for d in frac_digits.bytes() {
                if truncated {
                    continue;
                }
                match frac.checked_mul(10).and_then(|v| v.checked_add(u64::from(d - b'0'))) {
                    Some(v) => {
                        frac = v;
                        scale *= 10.0;
                    }
                    None => truncated = true,
                }
            }
            rest = after_frac;
        }
        if int_len == 0 && frac_len == 0 {
            return Err(invalid());
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        let (unit_text, after_unit) = rest.split_at(unit_len);
        if unit_text.is_empty() {
            return Err(DurationError::MissingUnit {
                input: input.to_string(),
            });
        }
        let unit = unit_nanos(unit_text).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit_text.to_string(),
            input: input.to_string(),
        })?;
        rest = after_unit;

        let mut value = whole.checked_mul(unit).ok_or_else(overflow)?;
        if frac > 0 {
            value = value
                .checked_add((frac as f64 * (unit as f64 / scale)) as u64)
                .ok_or_else(overflow)?;
        }
        total = total.checked_add(value).ok_or_else(overflow)?;
    }

    const LIMIT: u64 = 1 << 63;
    if negative {
        if total > LIMIT {
            return Err(overflow());
        }
        Ok((total as i64).wrapping_neg())
    } else {
        if total >= LIMIT {
            return Err(overflow());
        }
        Ok(total as i64)
    }
}

fn leading_int(digits: &str) -> Option<u64> {
    digits.bytes().try_fold(0u64, |acc, d| {
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}
