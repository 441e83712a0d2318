// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS InfluxDB Line Protocol encoder
//!
//! Turns one typed record into one InfluxDB v2 Line Protocol row.
//!
//! This crate provides:
//! - The [`LineProtocol`] record trait and `#[derive(LineProtocol)]`
//! - Per-role escaping and numeric type suffixes (`i`, `u`)
//! - Opt-in custom rendering through [`CustomFieldFormatter`]
//! - A duration formatter ([`duration::ScaledDuration`])
//! - YAML-driven mapping of JSON samples ([`mapping::JsonRecord`])
//!
//! # Overview
//!
//! The encoder does NOT batch or send lines. It produces one `String` per
//! record (no trailing newline) that can be sent via any HTTP client.
//!
//! ```text
//! record --> describe() --> resolve / classify / format --> assemble --> String
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use hdds_influx_line::LineProtocol;
//!
//! #[derive(LineProtocol)]
//! struct Stats {
//!     #[influx(measurement)]
//!     mode: String,
//!     #[influx(tag = "worker")]
//!     worker: String,
//!     #[influx(timestamp)]
//!     at: chrono::DateTime<Utc>,
//!     #[influx(field)]
//!     errors: i64,
//!     #[influx(field)]
//!     rate: f64,
//! }
//!
//! let stats = Stats {
//!     mode: "aggregate".into(),
//!     worker: "main".into(),
//!     at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
//!     errors: 121,
//!     rate: 45.678891,
//! };
//!
//! assert_eq!(
//!     stats.to_line_protocol().unwrap(),
//!     "aggregate,worker=main errors=121i,rate=45.678891 1700000000000000000"
//! );
//! ```

// Lets the derive's `::hdds_influx_line::` paths resolve inside this crate.
extern crate self as hdds_influx_line;

pub mod config;
pub mod duration;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod mapping;
pub mod record;
pub mod value;

pub use config::{ConfigError, RecordSchema};
pub use encoder::{encode, encode_descriptors};
pub use error::{BoxError, EncodeError, FieldFormatError};
pub use record::{FieldDescriptor, LineProtocol, Role};
pub use value::{CustomFieldFormatter, FieldValue, ToFieldValue};

#[cfg(feature = "derive")]
pub use hdds_influx_line_codegen::LineProtocol;

// Re-exported for generated code.
#[doc(hidden)]
pub use chrono;
