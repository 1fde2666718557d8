// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Operations scoped to one database.

use crate::client::Client;
use crate::error::{InflowError, Result};
use crate::point::Point;
use crate::policy::{ConsistencyLevel, RetentionPolicy};
use crate::query::{QueryBuilder, QueryResult, Series};

/// A named database on the client's server.
///
/// Writes go to the database's retention policy (`default` unless
/// changed with [`Database::with_retention_policy`]) with consistency `one`.
pub struct Database<'a> {
    name: String,
    client: &'a Client,
    retention_policy: RetentionPolicy,
}

impl<'a> Database<'a> {
    pub(crate) fn new(name: &str, client: &'a Client) -> Result<Self> {
        if name.is_empty() {
            return Err(InflowError::InvalidArgument(
                "database name is zero length".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            client,
            retention_policy: RetentionPolicy::default(),
        })
    }

    /// Write to `retention_policy` instead of `default`.
    pub fn with_retention_policy(mut self, retention_policy: RetentionPolicy) -> Self {
        self.retention_policy = retention_policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    pub fn retention_policy(&self) -> &RetentionPolicy {
        &self.retention_policy
    }

    /// Run `command` against this database.
    pub fn query(&self, command: &str) -> Result<QueryResult> {
        self.client.query(Some(&self.name), command)
    }

    /// Create the database, then `retention_policy` on it when given.
    ///
    /// Any failure is reported as [`InflowError::Database`].
    pub fn create(
        &self,
        retention_policy: Option<&RetentionPolicy>,
        if_not_exists: bool,
    ) -> Result<QueryResult> {
        self.try_create(retention_policy, if_not_exists)
            .map_err(|e| InflowError::Database {
                name: self.name.clone(),
                source: Box::new(e),
            })
    }

    fn try_create(
        &self,
        retention_policy: Option<&RetentionPolicy>,
        if_not_exists: bool,
    ) -> Result<QueryResult> {
        let command = if if_not_exists {
            format!("CREATE DATABASE IF NOT EXISTS {}", self.name)
        } else {
            format!("CREATE DATABASE {}", self.name)
        };
        let result = self.query(&command)?;

        if let Some(rp) = retention_policy {
            self.create_retention_policy(rp)?;
        }
        Ok(result)
    }

    /// Write one point; buffered when the client has batching enabled.
    pub fn write_point(&self, point: Point) -> Result<()> {
        self.client
            .write_point(&self.name, &self.retention_policy, point)
    }

    /// Write several points in one driver call, bypassing batching.
    pub fn write_points(&self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let records: Vec<String> = points.iter().map(Point::line_protocol).collect();
        self.client.write_records(
            &self.name,
            &self.retention_policy,
            ConsistencyLevel::One,
            &records,
        )
    }

    /// Whether the server lists this database.
    pub fn exists(&self) -> Result<bool> {
        Ok(self
            .client
            .list_databases()?
            .iter()
            .any(|db| *db == self.name))
    }

    pub fn create_retention_policy(&self, retention_policy: &RetentionPolicy) -> Result<QueryResult> {
        self.query(&retention_policy.to_query("CREATE", &self.name))
    }

    pub fn alter_retention_policy(&self, retention_policy: &RetentionPolicy) -> Result<QueryResult> {
        self.query(&retention_policy.to_query("ALTER", &self.name))
    }

    /// Names of the retention policies defined on this database.
    pub fn list_retention_policies(&self) -> Result<Vec<String>> {
        let result = self.query(&format!("SHOW RETENTION POLICIES ON {}", self.name))?;
        Ok(result
            .first_series()?
            .map(Series::first_column_values)
            .unwrap_or_default())
    }

    /// Drop the database and all its data.
    pub fn drop(&self) -> Result<QueryResult> {
        log::warn!("[client] dropping database {}", self.name);
        self.query(&format!("DROP DATABASE {}", self.name))
    }

    /// Start a `SELECT` against this database.
    pub fn query_builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }
}
