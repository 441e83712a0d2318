// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB v2 Line Protocol encoder.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! Encoding is a single pass over the record's descriptors:
//! resolve measurement and timestamp, split tags from fields (declaration
//! order kept), render each value, then assemble the line.
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use chrono::{DateTime, Utc};

use crate::error::{EncodeError, FieldFormatError};
use crate::escape::{escape_key, escape_measurement};
use crate::record::{FieldDescriptor, LineProtocol, Role};
use crate::value::FieldValue;

/// Encode a record as one Line Protocol line (no trailing newline).
pub fn encode<R: LineProtocol + ?Sized>(record: &R) -> Result<String, EncodeError> {
    record.to_line_protocol()
}

/// Encode a hand-built descriptor list.
///
/// `measurement_override` and `timestamp_override`, when `Some`, win over
/// descriptors declared with the `Measurement` / `Timestamp` role. When
/// several descriptors share one of those roles the last one wins.
pub fn encode_descriptors(
    descriptors: &[FieldDescriptor<'_>],
    measurement_override: Option<String>,
    timestamp_override: Option<DateTime<Utc>>,
) -> Result<String, EncodeError> {
    let mut declared_measurement: Option<&FieldDescriptor<'_>> = None;
    let mut declared_timestamp: Option<DateTime<Utc>> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut fields: Vec<String> = Vec::new();

    for desc in descriptors {
        let Some(role) = desc.role else {
            log::trace!("skipping `{}`: no line protocol role", desc.name);
            continue;
        };

        match role {
            Role::Measurement => declared_measurement = Some(desc),
            Role::Timestamp => match desc.value {
                FieldValue::Timestamp(ts) => declared_timestamp = Some(ts),
                _ => report_dropped(&FieldFormatError::NotATimestamp {
                    field: desc.name.to_string(),
                }),
            },
            Role::Tag => match desc.value.to_tag_text(&desc.name) {
                Ok(value) => tags.push(format!("{}={}", escape_key(&desc.name), value)),
                Err(e) => report_dropped(&e),
            },
            Role::Field => match desc.value.to_field_text(&desc.name) {
                Ok(value) => fields.push(format!("{}={}", escape_key(&desc.name), value)),
                Err(e) => report_dropped(&e),
            },
        }
    }

    let measurement = match measurement_override {
        Some(name) => name,
        None => match declared_measurement {
            Some(desc) => desc.value.to_plain_text(&desc.name).unwrap_or_else(|e| {
                report_dropped(&e);
                String::new()
            }),
            None => String::new(),
        },
    };
    if measurement.is_empty() {
        return Err(EncodeError::MissingMeasurement);
    }

    let timestamp = match timestamp_override.or(declared_timestamp) {
        Some(ts) if ts != DateTime::<Utc>::default() => ts,
        _ => return Err(EncodeError::MissingTimestamp),
    };
    let timestamp_ns = timestamp
        .timestamp_nanos_opt()
        .ok_or(EncodeError::TimestampOutOfRange { timestamp })?;

    if fields.is_empty() {
        return Err(EncodeError::NoFields);
    }

    log::debug!(
        "encoding `{}`: {} tags, {} fields",
        measurement,
        tags.len(),
        fields.len()
    );

    let line = assemble(&measurement, &tags, &fields, timestamp_ns);
    log::trace!("{}", line);
    Ok(line)
}

/// Join pre-rendered `key=value` entries into a line.
///
/// The tag segment (and its leading comma) is omitted when `tags` is empty.
fn assemble(measurement: &str, tags: &[String], fields: &[String], timestamp_ns: i64) -> String {
    let mut line = escape_measurement(measurement);

    for tag in tags {
        line.push(',');
        line.push_str(tag);
    }

    // Space separator before fields
    line.push(' ');
    line.push_str(&fields.join(","));

    // Space separator before timestamp
    line.push(' ');
    line.push_str(&timestamp_ns.to_string());

    line
}

fn report_dropped(err: &FieldFormatError) {
    log::warn!("[INFLUX-LINE] dropping entry: {}", err);
}
