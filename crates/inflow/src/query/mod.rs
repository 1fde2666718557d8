// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Query requests and responses.
//!
//! Responses are decoded as-is from the server's JSON:
//!
//! ```text
//! {"results":[{"series":[{"name":"databases","columns":["name"],"values":[["mydb"]]}]}]}
//! ```

mod builder;

pub use builder::QueryBuilder;

use crate::error::{InflowError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Timestamp precision of returned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl Precision {
    /// Value of the `epoch` query parameter.
    pub fn as_epoch(&self) -> &'static str {
        match self {
            Self::Hours => "h",
            Self::Minutes => "m",
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "u",
            Self::Nanoseconds => "ns",
        }
    }
}

/// A query command, optionally bound to a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub command: String,
    pub database: Option<String>,
    pub precision: Option<Precision>,
}

impl Query {
    pub fn new(command: impl Into<String>, database: Option<&str>) -> Self {
        Self {
            command: command.into(),
            database: database.map(str::to_string),
            precision: None,
        }
    }

    /// Ask for epoch timestamps in `precision` instead of RFC 3339 strings.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }
}

/// Response to a query request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of one statement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: Option<u64>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A named table of rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl Series {
    /// First column of every row, as strings.
    ///
    /// Handy for `SHOW DATABASES`, `SHOW USERS` and similar listings.
    pub fn first_column_values(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|row| row.first())
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

impl QueryResult {
    /// Whether the request or any statement reported an error.
    pub fn has_error(&self) -> bool {
        self.error.is_some() || self.results.iter().any(|r| r.error.is_some())
    }

    /// Turn a server-reported error into `Err`.
    pub fn into_checked(self) -> Result<Self> {
        if let Some(error) = &self.error {
            return Err(InflowError::Query(error.clone()));
        }
        if let Some(error) = self.results.iter().find_map(|r| r.error.as_ref()) {
            return Err(InflowError::Query(error.clone()));
        }
        Ok(self)
    }

    /// First series of the first statement, if the statement returned any.
    pub fn first_series(&self) -> Result<Option<&Series>> {
        let statement = self
            .results
            .first()
            .ok_or_else(|| InflowError::Query("response contains no results".to_string()))?;
        Ok(statement.series.first())
    }
}
