// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record description: the ordered, typed view of a record's fields.
//!
//! A record is anything implementing [`LineProtocol`]. Implementations
//! usually come from `#[derive(LineProtocol)]`; hand-written ones and the
//! JSON mapper in [`crate::mapping`] produce the same descriptors.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::encoder;
use crate::error::EncodeError;
use crate::value::{FieldValue, ToFieldValue};

/// Role a record field plays in the encoded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Series name. The descriptor name is not used.
    Measurement,
    /// Point time. The descriptor name is not used.
    Timestamp,
    /// Indexed string key/value.
    Tag,
    /// Typed value.
    Field,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Measurement => "measurement",
            Role::Timestamp => "timestamp",
            Role::Tag => "tag",
            Role::Field => "field",
        };
        f.write_str(s)
    }
}

/// One record field: declared name, role and current value.
///
/// A descriptor without a role is carried through and ignored by the
/// encoder.
#[derive(Debug, Clone)]
pub struct FieldDescriptor<'a> {
    pub name: Cow<'a, str>,
    pub role: Option<Role>,
    pub value: FieldValue<'a>,
}

impl<'a> FieldDescriptor<'a> {
    pub fn new(name: impl Into<Cow<'a, str>>, role: Option<Role>, value: FieldValue<'a>) -> Self {
        Self {
            name: name.into(),
            role,
            value,
        }
    }

    pub fn measurement<T: ToFieldValue + ?Sized>(value: &'a T) -> Self {
        Self::new("", Some(Role::Measurement), value.to_field_value())
    }

    pub fn timestamp<T: ToFieldValue + ?Sized>(value: &'a T) -> Self {
        Self::new("", Some(Role::Timestamp), value.to_field_value())
    }

    pub fn tag<T: ToFieldValue + ?Sized>(name: impl Into<Cow<'a, str>>, value: &'a T) -> Self {
        Self::new(name, Some(Role::Tag), value.to_field_value())
    }

    pub fn field<T: ToFieldValue + ?Sized>(name: impl Into<Cow<'a, str>>, value: &'a T) -> Self {
        Self::new(name, Some(Role::Field), value.to_field_value())
    }

    /// A field with no recognised role annotation.
    pub fn unassigned<T: ToFieldValue + ?Sized>(name: impl Into<Cow<'a, str>>, value: &'a T) -> Self {
        Self::new(name, None, value.to_field_value())
    }
}

/// A record that can be written as one Line Protocol row.
///
/// `describe` returns the fields in declaration order. The two overrides
/// take precedence over any field declared with the same role.
pub trait LineProtocol {
    /// Ordered field descriptors for this record instance.
    fn describe(&self) -> Vec<FieldDescriptor<'_>>;

    /// Measurement name supplied by the record type rather than a field.
    fn measurement_override(&self) -> Option<String> {
        None
    }

    /// Timestamp supplied by the record type rather than a field.
    fn timestamp_override(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Encode this record as a single line, without trailing newline.
    fn to_line_protocol(&self) -> Result<String, EncodeError> {
        encoder::encode_descriptors(
            &self.describe(),
            self.measurement_override(),
            self.timestamp_override(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_roles() {
        let worker = "main";
        let errors = 121i64;
        let tags = [
            FieldDescriptor::tag("worker", worker),
            FieldDescriptor::field("errors", &errors),
            FieldDescriptor::unassigned("ignored", &errors),
            FieldDescriptor::measurement("cpu"),
        ];
        assert_eq!(tags[0].role, Some(Role::Tag));
        assert_eq!(tags[0].name, "worker");
        assert_eq!(tags[1].role, Some(Role::Field));
        assert!(matches!(tags[1].value, FieldValue::Integer(121)));
        assert_eq!(tags[2].role, None);
        assert_eq!(tags[3].role, Some(Role::Measurement));
        assert_eq!(tags[3].name, "");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Measurement.to_string(), "measurement");
        assert_eq!(Role::Timestamp.to_string(), "timestamp");
        assert_eq!(Role::Tag.to_string(), "tag");
        assert_eq!(Role::Field.to_string(), "field");
    }
}
