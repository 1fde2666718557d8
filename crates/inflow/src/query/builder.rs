// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder for `SELECT` statements against one database.

use super::QueryResult;
use crate::database::Database;
use crate::error::{InflowError, Result};
use chrono::{TimeZone, Utc};

/// Builds `SELECT <selection> FROM <measurement> [WHERE ..] [GROUP BY ..] [LIMIT n]`.
///
/// ```rust,ignore
/// let result = db
///     .query_builder()
///     .mean("value")
///     .from("cpu")
///     .time_range(from_ms, to_ms)
///     .group_by("host")
///     .execute()?;
/// ```
pub struct QueryBuilder<'a> {
    db: &'a Database<'a>,
    selection: String,
    measurement: Option<String>,
    conditions: Vec<String>,
    group_by: Vec<String>,
    limit: Option<usize>,
    invalid: Option<String>,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(db: &'a Database<'a>) -> Self {
        Self {
            db,
            selection: "*".to_string(),
            measurement: None,
            conditions: Vec::new(),
            group_by: Vec::new(),
            limit: None,
            invalid: None,
        }
    }

    /// Measurement to select from (required).
    pub fn from(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = Some(measurement.into());
        self
    }

    /// Custom selection, e.g. `sum(value),max(value)`.
    pub fn select(mut self, selection: impl Into<String>) -> Self {
        self.selection = selection.into();
        self
    }

    /// Add a condition; conditions are joined with `AND`.
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Add several conditions at once.
    pub fn where_all<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.extend(conditions.into_iter().map(Into::into));
        self
    }

    pub fn count(self, field: &str) -> Self {
        self.aggregate("count", field)
    }

    pub fn median(self, field: &str) -> Self {
        self.aggregate("median", field)
    }

    pub fn mean(self, field: &str) -> Self {
        self.aggregate("mean", field)
    }

    pub fn sum(self, field: &str) -> Self {
        self.aggregate("sum", field)
    }

    pub fn first(self, field: &str) -> Self {
        self.aggregate("first", field)
    }

    pub fn last(self, field: &str) -> Self {
        self.aggregate("last", field)
    }

    /// Select the `percentile`-th percentile of `field` (e.g. 95). Must be at most 100.
    pub fn percentile(mut self, field: &str, percentile: u8) -> Self {
        if percentile > 100 {
            self.invalid = Some(format!(
                "percentile must be between 0 and 100, got {}",
                percentile
            ));
        }
        self.selection = format!("percentile({}, {})", field, percentile);
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    /// Restrict to `from_ms < time < to_ms` (milliseconds since the Unix epoch, UTC).
    pub fn time_range(mut self, from_ms: i64, to_ms: i64) -> Self {
        match (format_time(from_ms), format_time(to_ms)) {
            (Some(from), Some(to)) => {
                self.conditions.push(format!("time > '{}'", from));
                self.conditions.push(format!("time < '{}'", to));
            }
            _ => {
                self.invalid = Some(format!(
                    "time range {}..{} is out of range",
                    from_ms, to_ms
                ));
            }
        }
        self
    }

    /// Limit the number of returned rows.
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// Render the statement.
    pub fn build(&self) -> Result<String> {
        if let Some(reason) = &self.invalid {
            return Err(InflowError::InvalidArgument(reason.clone()));
        }
        let measurement = self.measurement.as_deref().ok_or_else(|| {
            InflowError::InvalidArgument("no measurement provided to from()".to_string())
        })?;

        let mut query = format!("SELECT {} FROM {}", self.selection, measurement);

        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }

        if !self.group_by.is_empty() {
            query.push_str(" GROUP BY ");
            query.push_str(&self.group_by.join(","));
        }

        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(query)
    }

    /// Build and run the statement against the builder's database.
    pub fn execute(&self) -> Result<QueryResult> {
        let query = self.build()?;
        self.db.query(&query)
    }

    fn aggregate(mut self, function: &str, field: &str) -> Self {
        self.selection = format!("{}({})", function, field);
        self
    }
}

fn format_time(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::driver::testing::RecordingDriver;
    use crate::error::InflowError;
    use std::sync::Arc;

    fn client() -> Client {
        Client::with_driver(Arc::new(RecordingDriver::default()))
    }

    #[test]
    fn test_select_all() {
        let client = client();
        let db = client.select_db("metrics").expect("database");
        let query = db.query_builder().from("cpu").build().expect("query");
        assert_eq!(query, "SELECT * FROM cpu");
    }

    #[test]
    fn test_conditions_group_and_limit() {
        let client = client();
        let db = client.select_db("metrics").expect("database");
        let query = db
            .query_builder()
            .mean("value")
            .from("cpu")
            .where_clause("host = 'a'")
            .where_all(["region = 'eu'", "time > now() - 1h"])
            .group_by("host")
            .group_by("region")
            .limit(10)
            .build()
            .expect("query");

        assert_eq!(
            query,
            "SELECT mean(value) FROM cpu WHERE host = 'a' AND region = 'eu' AND time > now() - 1h GROUP BY host,region LIMIT 10"
        );
    }

    #[test]
    fn test_time_range_and_percentile() {
        let client = client();
        let db = client.select_db("metrics").expect("database");
        let query = db
            .query_builder()
            .percentile("value", 95)
            .from("latency")
            .time_range(1_433_601_327_195, 1_433_601_384_556)
            .build()
            .expect("query");

        assert_eq!(
            query,
            "SELECT percentile(value, 95) FROM latency WHERE time > '2015-06-06T14:35:27.195Z' AND time < '2015-06-06T14:36:24.556Z'"
        );
    }

    #[test]
    fn test_percentile_out_of_range() {
        let client = client();
        let db = client.select_db("metrics").expect("database");

        let err = db
            .query_builder()
            .percentile("value", 101)
            .from("latency")
            .build()
            .unwrap_err();
        assert!(matches!(err, InflowError::InvalidArgument(_)));

        let query = db
            .query_builder()
            .percentile("value", 100)
            .from("latency")
            .build()
            .expect("query");
        assert_eq!(query, "SELECT percentile(value, 100) FROM latency");
    }

    #[test]
    fn test_missing_measurement() {
        let client = client();
        let db = client.select_db("metrics").expect("database");
        let err = db.query_builder().count("value").build().unwrap_err();
        assert!(matches!(err, InflowError::InvalidArgument(_)));
    }
}
