// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Points, grouped batches and their line protocol rendering.
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! A [`Point`] is opaque to the batching engine: it is only ever moved
//! around whole and rendered by the transports.

use crate::error::{InflowError, Result};
use crate::policy::{ConsistencyLevel, RetentionPolicy};
use std::collections::BTreeMap;
use std::fmt;

/// A value stored in a point field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for FieldValue {
    /// Floats as-is, integers with an `i` suffix, strings quoted with
    /// `"` and `\` escaped, booleans as `true`/`false`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}i", v),
            FieldValue::String(v) => {
                write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
            }
            FieldValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

/// One measurement observation.
///
/// Tags are kept sorted by key so the rendered line is canonical. Fields
/// keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, FieldValue)>,
    timestamp_ns: Option<i64>,
}

impl Point {
    /// Start building a point for `measurement`.
    pub fn builder(measurement: impl Into<String>) -> PointBuilder {
        PointBuilder {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: Vec::new(),
            timestamp_ns: None,
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Timestamp in nanoseconds since the Unix epoch; `None` lets the server stamp it.
    pub fn timestamp_ns(&self) -> Option<i64> {
        self.timestamp_ns
    }

    /// Render this point as a single line protocol line.
    pub fn line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_string());
        }

        if let Some(ts) = self.timestamp_ns {
            line.push(' ');
            line.push_str(&ts.to_string());
        }

        line
    }
}

/// Builder for [`Point`].
#[derive(Debug, Clone)]
pub struct PointBuilder {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, FieldValue)>,
    timestamp_ns: Option<i64>,
}

impl PointBuilder {
    /// Add a tag. A repeated key replaces the previous value.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Set the timestamp in nanoseconds since the Unix epoch.
    pub fn timestamp(mut self, timestamp_ns: i64) -> Self {
        self.timestamp_ns = Some(timestamp_ns);
        self
    }

    /// Finish the point. At least one field and a measurement name are required.
    ///
    /// Line breaks anywhere in the point are rejected, as are NaN and
    /// infinite floats: the server refuses them, and with them the whole
    /// batch the point travels in.
    pub fn build(self) -> Result<Point> {
        if self.measurement.is_empty() {
            return Err(InflowError::Point("measurement name is empty".to_string()));
        }
        if self.fields.is_empty() {
            return Err(InflowError::Point(format!(
                "point '{}' has no fields",
                self.measurement
            )));
        }

        check_single_line("measurement", &self.measurement)?;
        for (key, value) in &self.tags {
            check_single_line("tag key", key)?;
            check_single_line("tag value", value)?;
        }
        for (key, value) in &self.fields {
            check_single_line("field key", key)?;
            match value {
                FieldValue::Float(v) if !v.is_finite() => {
                    return Err(InflowError::Point(format!(
                        "field '{}' of '{}' is not a finite number: {}",
                        key, self.measurement, v
                    )));
                }
                FieldValue::String(v) => check_single_line("string field", v)?,
                _ => {}
            }
        }

        Ok(Point {
            measurement: self.measurement,
            tags: self.tags,
            fields: self.fields,
            timestamp_ns: self.timestamp_ns,
        })
    }
}

/// Points sharing one destination, sent in a single transport call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPoints {
    pub database: String,
    pub retention_policy: RetentionPolicy,
    pub consistency: ConsistencyLevel,
    pub points: Vec<Point>,
}

impl BatchPoints {
    /// Create an empty batch for a destination.
    pub fn new(database: impl Into<String>, retention_policy: RetentionPolicy) -> Self {
        Self {
            database: database.into(),
            retention_policy,
            consistency: ConsistencyLevel::default(),
            points: Vec::new(),
        }
    }

    /// Set the write consistency.
    pub fn consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = consistency;
        self
    }

    /// Append a point.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points rendered as line protocol, one per line.
    pub fn line_protocol(&self) -> String {
        self.lines().join("\n")
    }

    /// All points rendered as individual lines.
    pub fn lines(&self) -> Vec<String> {
        self.points.iter().map(Point::line_protocol).collect()
    }
}

fn check_single_line(what: &str, s: &str) -> Result<()> {
    if s.contains(['\n', '\r']) {
        return Err(InflowError::Point(format!(
            "{} {:?} contains a line break",
            what, s
        )));
    }
    Ok(())
}

/// Measurement names escape commas and spaces.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys escape commas, equals signs and spaces.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
