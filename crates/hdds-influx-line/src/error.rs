// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for line protocol encoding.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Boxed error returned by custom field formatters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort encoding of a record.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No measurement override and no non-empty `measurement` field.
    #[error("measurement not found: record has no measurement override or `measurement` field")]
    MissingMeasurement,

    /// No timestamp override and no non-zero `timestamp` field.
    #[error("timestamp not found: record has no timestamp override or `timestamp` field")]
    MissingTimestamp,

    /// The resolved instant does not fit in signed 64-bit nanoseconds.
    #[error("timestamp {timestamp} cannot be expressed as nanoseconds since epoch")]
    TimestampOutOfRange { timestamp: DateTime<Utc> },

    /// Nothing survived into the field set (InfluxDB requires at least one field).
    #[error("record produced no fields")]
    NoFields,
}

/// Per-entry failures.
///
/// These never abort encoding: the offending tag or field is dropped and the
/// error is logged at warn level.
#[derive(Debug, Error)]
pub enum FieldFormatError {
    /// A [`CustomFieldFormatter`](crate::CustomFieldFormatter) returned an error.
    #[error("custom formatter for `{field}` failed: {source}")]
    Custom {
        field: String,
        #[source]
        source: BoxError,
    },

    /// NaN and infinities have no line protocol representation.
    #[error("field `{field}` holds non-finite float {value}")]
    NonFiniteFloat { field: String, value: f64 },

    /// A field declared as the timestamp does not hold an instant.
    #[error("field `{field}` is declared as timestamp but does not hold a timestamp value")]
    NotATimestamp { field: String },

    /// A timestamp used as a field value does not fit in `i64` nanoseconds.
    #[error("timestamp in field `{field}` cannot be expressed as nanoseconds since epoch")]
    TimestampOutOfRange { field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_error_keeps_source() {
        let err = FieldFormatError::Custom {
            field: "execTime".to_string(),
            source: "missing unit in duration \"345.12\"".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("execTime"));
        assert!(msg.contains("missing unit in duration"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_encode_error_display() {
        assert_eq!(EncodeError::NoFields.to_string(), "record produced no fields");
        assert!(EncodeError::MissingMeasurement
            .to_string()
            .starts_with("measurement not found"));
    }
}
