// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON record mapping to Line Protocol roles.
//!
//! [`JsonRecord`] pairs a JSON sample with a [`RecordSchema`] and implements
//! [`LineProtocol`], so untyped input goes through the same encoder as
//! derived structs.

use std::borrow::Cow;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::RecordSchema;
use crate::duration::ScaledDuration;
use crate::record::{FieldDescriptor, LineProtocol, Role};
use crate::value::FieldValue;

/// A JSON sample viewed through a schema.
pub struct JsonRecord<'a> {
    schema: &'a RecordSchema,
    sample: &'a Value,
    /// Duration fields, rendered lazily by the encoder.
    durations: Vec<(&'a str, ScaledDuration)>,
}

impl<'a> JsonRecord<'a> {
    pub fn new(schema: &'a RecordSchema, sample: &'a Value) -> Self {
        let durations = schema
            .fields
            .iter()
            .filter_map(|path| {
                let unit = schema.durations.get(path)?;
                let text = resolve_field(sample, path)?.as_str()?;
                Some((path.as_str(), ScaledDuration::new(text, Some(*unit))))
            })
            .collect();
        Self {
            schema,
            sample,
            durations,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = resolve_field(self.sample, &self.schema.timestamp_field)?;
        match raw {
            Value::Number(n) => {
                let ns = n
                    .as_i64()
                    .and_then(|v| v.checked_mul(self.schema.timestamp_unit.nanos()));
                if ns.is_none() {
                    log::warn!(
                        "[INFLUX-LINE] timestamp `{}` is not an i64 nanosecond count: {}",
                        self.schema.timestamp_field,
                        n
                    );
                }
                ns.map(|ns| Utc.timestamp_nanos(ns))
            }
            Value::String(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    log::warn!(
                        "[INFLUX-LINE] timestamp `{}` is not RFC 3339: {}",
                        self.schema.timestamp_field,
                        e
                    );
                    None
                }
            },
            other => {
                log::warn!(
                    "[INFLUX-LINE] timestamp `{}` has unsupported JSON type: {}",
                    self.schema.timestamp_field,
                    other
                );
                None
            }
        }
    }
}

impl LineProtocol for JsonRecord<'_> {
    fn describe(&self) -> Vec<FieldDescriptor<'_>> {
        let mut out = Vec::with_capacity(self.schema.tags.len() + self.schema.fields.len() + 1);

        if let Some(path) = &self.schema.measurement_field {
            if let Some(value) = resolve_field(self.sample, path).and_then(json_to_value) {
                out.push(FieldDescriptor::new(path.as_str(), Some(Role::Measurement), value));
            }
        }

        // Missing or null tags are silently skipped.
        for path in &self.schema.tags {
            if let Some(value) = resolve_field(self.sample, path).and_then(json_to_value) {
                out.push(FieldDescriptor::new(path.as_str(), Some(Role::Tag), value));
            }
        }

        // Missing or null fields are silently skipped.
        for path in &self.schema.fields {
            if let Some((_, d)) = self.durations.iter().find(|(p, _)| *p == path.as_str()) {
                out.push(FieldDescriptor::new(path.as_str(), Some(Role::Field), FieldValue::Custom(d)));
                continue;
            }
            if let Some(value) = resolve_field(self.sample, path).and_then(json_to_value) {
                out.push(FieldDescriptor::new(path.as_str(), Some(Role::Field), value));
            }
        }

        out
    }

    fn measurement_override(&self) -> Option<String> {
        self.schema.measurement.clone().filter(|m| !m.is_empty())
    }

    fn timestamp_override(&self) -> Option<DateTime<Utc>> {
        self.timestamp()
    }
}

/// Resolve a potentially dot-separated field path in a JSON value.
///
/// For example, `"location.lat"` resolves `json["location"]["lat"]`.
fn resolve_field<'v>(json: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = json;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Convert a JSON value to a [`FieldValue`] with type inference.
fn json_to_value(val: &Value) -> Option<FieldValue<'_>> {
    match val {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(FieldValue::Integer(i))
            } else if let Some(u) = n.as_u64() {
                Some(FieldValue::Unsigned(u))
            } else {
                n.as_f64().map(FieldValue::Float)
            }
        }
        Value::String(s) => Some(FieldValue::String(Cow::Borrowed(s.as_str()))),
        Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        Value::Null => None,
        // Arrays and objects are not valid tag or field values
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;
    use serde_json::json;

    fn schema(yaml: &str) -> RecordSchema {
        RecordSchema::from_yaml(yaml).expect("schema")
    }

    const AGGREGATE_SCHEMA: &str = r#"
measurement_field: mode
timestamp_field: ts
tags: [worker]
fields: [errors, rate, execTime]
durations:
  execTime: m
"#;

    #[test]
    fn test_json_record_aggregate() {
        let schema = schema(AGGREGATE_SCHEMA);
        let sample = json!({
            "mode": "aggregate",
            "worker": "main",
            "ts": 1_700_000_000_000_000_000i64,
            "errors": 121,
            "rate": 45.678891,
            "execTime": "39m47.276156216s"
        });

        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(
            line,
            "aggregate,worker=main errors=121i,rate=45.678891,execTime=39.79 1700000000000000000"
        );
    }

    #[test]
    fn test_json_record_literal_measurement_wins() {
        let schema = schema(
            "measurement: download\nmeasurement_field: mode\ntimestamp_field: ts\nfields: [v]\n",
        );
        let sample = json!({"mode": "upload", "ts": 5, "v": 1});
        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(line, "download v=1i 5");
    }

    #[test]
    fn test_json_record_nested_paths_and_units() {
        let schema = schema(
            r#"
measurement: position
timestamp_field: meta.time
timestamp_unit: s
tags: [meta.region]
fields: [location.lat, location.lon]
"#,
        );
        let sample = json!({
            "meta": { "region": "eu west", "time": 1_700_000_000 },
            "location": { "lat": 48.8566, "lon": 2.3522 }
        });
        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(
            line,
            "position,meta.region=eu\\ west location.lat=48.8566,location.lon=2.3522 1700000000000000000"
        );
    }

    #[test]
    fn test_json_record_rfc3339_timestamp() {
        let schema = schema("measurement: m\ntimestamp_field: time\nfields: [v]\n");
        let sample = json!({"time": "2023-11-14T22:13:20.5Z", "v": true});
        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(line, "m v=true 1700000000500000000");
    }

    #[test]
    fn test_json_record_type_inference() {
        let schema = schema("measurement: m\ntimestamp_field: t\nfields: [i, u, f, s, b]\n");
        let sample = json!({
            "t": 1,
            "i": -3,
            "u": 18_446_744_073_709_551_615u64,
            "f": 1.5,
            "s": "a \"q\"",
            "b": false
        });
        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(
            line,
            "m i=-3i,u=18446744073709551615u,f=1.5,s=\"a \\\"q\\\"\",b=false 1"
        );
    }

    #[test]
    fn test_json_record_missing_values_skipped() {
        let schema = schema("measurement: m\ntimestamp_field: t\ntags: [gone, obj]\nfields: [nil, arr, v]\n");
        let sample = json!({"t": 1, "obj": {"x": 1}, "nil": null, "arr": [1, 2], "v": 2});
        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(line, "m v=2i 1");
    }

    #[test]
    fn test_json_record_errors() {
        let schema = schema("measurement_field: name\ntimestamp_field: t\nfields: [v]\n");

        let sample = json!({"t": 1, "v": 1});
        let err = JsonRecord::new(&schema, &sample).to_line_protocol().unwrap_err();
        assert!(matches!(err, EncodeError::MissingMeasurement));

        let sample = json!({"name": "m", "v": 1});
        let err = JsonRecord::new(&schema, &sample).to_line_protocol().unwrap_err();
        assert!(matches!(err, EncodeError::MissingTimestamp));

        let sample = json!({"name": "m", "t": "not a time", "v": 1});
        let err = JsonRecord::new(&schema, &sample).to_line_protocol().unwrap_err();
        assert!(matches!(err, EncodeError::MissingTimestamp));

        let sample = json!({"name": "m", "t": 1});
        let err = JsonRecord::new(&schema, &sample).to_line_protocol().unwrap_err();
        assert!(matches!(err, EncodeError::NoFields));
    }

    #[test]
    fn test_json_record_unusable_numeric_timestamp() {
        let schema = schema("measurement_field: name\ntimestamp_field: t\nfields: [v]\n");

        for t in [json!(1.5), json!(u64::MAX), json!(true)] {
            let sample = json!({"name": "m", "t": t, "v": 1});
            let err = JsonRecord::new(&schema, &sample).to_line_protocol().unwrap_err();
            assert!(matches!(err, EncodeError::MissingTimestamp));
        }

        // Scaling by the unit must not overflow silently into a bogus time.
        let schema = schema_with_unit("s");
        let sample = json!({"name": "m", "t": i64::MAX / 10, "v": 1});
        let err = JsonRecord::new(&schema, &sample).to_line_protocol().unwrap_err();
        assert!(matches!(err, EncodeError::MissingTimestamp));
    }

    fn schema_with_unit(unit: &str) -> RecordSchema {
        schema(&format!(
            "measurement_field: name\ntimestamp_field: t\ntimestamp_unit: {}\nfields: [v]\n",
            unit
        ))
    }

    #[test]
    fn test_json_record_bad_duration_drops_field() {
        let schema = schema(AGGREGATE_SCHEMA);
        let sample = json!({
            "mode": "aggregate",
            "ts": 10,
            "errors": 1,
            "execTime": "345.12"
        });
        let line = JsonRecord::new(&schema, &sample).to_line_protocol().expect("encode");
        assert_eq!(line, "aggregate errors=1i 10");
    }

    #[test]
    fn test_resolve_field_paths() {
        let v = json!({"a": {"b": {"c": 1}}});
        assert_eq!(resolve_field(&v, "a.b.c"), Some(&json!(1)));
        assert!(resolve_field(&v, "a.x").is_none());
    }
}
