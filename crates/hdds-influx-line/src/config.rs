// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML schema describing how a JSON record maps to Line Protocol roles.
//!
//! ```yaml
//! measurement: worker_stats        # literal name, or:
//! measurement_field: mode          # take the name from a record field
//! timestamp_field: time
//! timestamp_unit: ms               # ns (default), us, ms, s
//! tags: [worker, meta.region]
//! fields: [errors, rate, execTime]
//! durations:
//!   execTime: m
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::duration::DurationUnit;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid schema: {0}")]
    Invalid(String),
}

/// Scale of integer timestamps found in records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampUnit {
    S,
    Ms,
    Us,
    #[default]
    Ns,
}

impl TimestampUnit {
    /// Nanoseconds per unit.
    pub fn nanos(self) -> i64 {
        match self {
            TimestampUnit::S => 1_000_000_000,
            TimestampUnit::Ms => 1_000_000,
            TimestampUnit::Us => 1_000,
            TimestampUnit::Ns => 1,
        }
    }
}

/// Mapping of JSON record paths to measurement, timestamp, tags and fields.
///
/// Paths use dot notation for nested objects (`"location.lat"`). Tags and
/// fields keep the order they are listed in.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSchema {
    /// Literal measurement name. Takes precedence over `measurement_field`.
    #[serde(default)]
    pub measurement: Option<String>,
    /// Record path holding the measurement name.
    #[serde(default)]
    pub measurement_field: Option<String>,
    /// Record path holding the timestamp (integer or RFC 3339 string).
    pub timestamp_field: String,
    /// Scale of integer timestamps.
    #[serde(default)]
    pub timestamp_unit: TimestampUnit,
    /// Record paths written as tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Record paths written as fields.
    pub fields: Vec<String>,
    /// Fields holding duration text, with the unit to write them in.
    #[serde(default)]
    pub durations: HashMap<String, DurationUnit>,
}

impl RecordSchema {
    /// Parse and validate a schema from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let schema: RecordSchema = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parse and validate a schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject schemas that can never produce a line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fields.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one field is required".to_string(),
            ));
        }
        if self.measurement.as_deref().map_or(true, str::is_empty)
            && self.measurement_field.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "either `measurement` or `measurement_field` must be set".to_string(),
            ));
        }
        if self.timestamp_field.is_empty() {
            return Err(ConfigError::Invalid(
                "`timestamp_field` must not be empty".to_string(),
            ));
        }
        for path in self.durations.keys() {
            if !self.fields.contains(path) {
                return Err(ConfigError::Invalid(format!(
                    "duration `{}` is not listed in `fields`",
                    path
                )));
            }
        }
        Ok(())
    }
}
