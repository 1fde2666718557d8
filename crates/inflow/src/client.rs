// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client entry point.
//!
//! A [`Client`] owns one driver and, optionally, a [`BatchProcessor`]
//! feeding that same driver. Databases and the admin API borrow the
//! client.

use crate::admin::Admin;
use crate::batch::{BatchProcessor, BatchStats};
use crate::config::{ConnectionConfig, InflowConfig, Transport};
use crate::database::Database;
use crate::driver::{HttpDriver, UdpDriver, WriteDriver};
use crate::error::{InflowError, Result};
use crate::point::{BatchPoints, Point};
use crate::policy::{ConsistencyLevel, RetentionPolicy};
use crate::query::{Query, QueryResult, Series};
use std::sync::Arc;
use std::time::Duration;

/// Connection to one server.
pub struct Client {
    driver: Arc<dyn WriteDriver>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    batch: Option<BatchProcessor>,
}

impl Client {
    /// Connect with the driver selected by `connection.transport`.
    ///
    /// UDP writes go to `connection.udp_port`; the HTTP base URL is kept
    /// for reference either way.
    pub fn new(connection: &ConnectionConfig) -> Result<Self> {
        connection.validate()?;

        let driver: Arc<dyn WriteDriver> = match connection.transport {
            Transport::Http => Arc::new(HttpDriver::from_connection(connection)?),
            Transport::Udp => Arc::new(UdpDriver::new(&connection.host, connection.udp_port)?),
        };

        log::info!(
            "[client] connected to {} ({:?})",
            connection.base_url(),
            connection.transport
        );

        Ok(Self {
            driver,
            base_url: Some(connection.base_url()),
            timeout: connection.timeout(),
            batch: None,
        })
    }

    /// Client over an already built driver.
    pub fn with_driver(driver: Arc<dyn WriteDriver>) -> Self {
        Self {
            driver,
            base_url: None,
            timeout: None,
            batch: None,
        }
    }

    /// Client from a parsed configuration; batching is enabled when the
    /// `batch` section is present.
    pub fn from_config(config: &InflowConfig) -> Result<Self> {
        config.validate()?;
        let mut client = Self::new(&config.connection)?;
        if let Some(batch) = &config.batch {
            client.enable_batch(batch.actions, batch.flush_interval())?;
        }
        Ok(client)
    }

    /// Route `write_point` calls through a batch processor.
    ///
    /// A processor that is already running is shut down first, which
    /// flushes whatever it still holds. Invalid settings leave the current
    /// state untouched. If the final flush of the previous processor fails,
    /// the new processor is installed anyway and that flush error is
    /// returned.
    pub fn enable_batch(&mut self, actions: usize, flush_interval: Duration) -> Result<()> {
        let processor = BatchProcessor::builder()
            .driver(Arc::clone(&self.driver))
            .actions(actions)
            .interval(flush_interval)
            .build()?;

        let previous_flush = match self.batch.take() {
            Some(previous) => previous.shutdown(),
            None => Ok(()),
        };
        if let Err(e) = &previous_flush {
            log::warn!("[client] final flush of replaced batch processor failed: {}", e);
        }

        self.batch = Some(processor);
        log::info!(
            "[client] batching enabled: {} actions, {:?} interval",
            actions,
            flush_interval
        );
        previous_flush
    }

    /// Shut down the batch processor, writing what it still holds.
    ///
    /// Later `write_point` calls go straight to the driver. Does nothing
    /// when batching is off.
    pub fn disable_batch(&mut self) -> Result<()> {
        match self.batch.take() {
            Some(processor) => {
                log::info!("[client] batching disabled");
                processor.shutdown()
            }
            None => Ok(()),
        }
    }

    pub fn is_batch_enabled(&self) -> bool {
        self.batch.is_some()
    }

    /// Counters of the running batch processor.
    pub fn batch_stats(&self) -> Option<BatchStats> {
        self.batch.as_ref().map(BatchProcessor::stats)
    }

    /// Write one point, buffered when batching is enabled.
    pub fn write_point(
        &self,
        database: &str,
        retention_policy: &RetentionPolicy,
        point: Point,
    ) -> Result<()> {
        match &self.batch {
            Some(processor) => processor.write(point, database, retention_policy.clone()),
            None => self.driver.write_point(database, retention_policy, &point),
        }
    }

    /// Write a grouped batch directly, bypassing the batch processor.
    pub fn write_batch(&self, batch: &BatchPoints) -> Result<()> {
        self.driver.write_batch(batch)
    }

    /// Write pre-rendered line protocol records directly.
    pub fn write_records(
        &self,
        database: &str,
        retention_policy: &RetentionPolicy,
        consistency: ConsistencyLevel,
        records: &[String],
    ) -> Result<()> {
        self.driver.write_records(database, retention_policy, consistency, records)
    }

    /// Write out everything the batch processor holds. No-op without batching.
    pub fn flush(&self) -> Result<()> {
        match &self.batch {
            Some(processor) => processor.flush(),
            None => Ok(()),
        }
    }

    /// Run `command`, optionally against `database`.
    ///
    /// A server-reported error comes back as [`InflowError::Query`].
    pub fn query(&self, database: Option<&str>, command: &str) -> Result<QueryResult> {
        self.query_with(&Query::new(command, database))
    }

    /// Run a prepared query.
    pub fn query_with(&self, query: &Query) -> Result<QueryResult> {
        let driver = self
            .driver
            .as_query_driver()
            .ok_or(InflowError::UnsupportedQuery)?;
        log::debug!("[client] query: {}", query.command);
        driver.query(query)?.into_checked()
    }

    /// Names of all databases.
    pub fn list_databases(&self) -> Result<Vec<String>> {
        let result = self.query(None, "SHOW DATABASES")?;
        Ok(result
            .first_series()?
            .map(Series::first_column_values)
            .unwrap_or_default())
    }

    /// Names of all users.
    pub fn list_users(&self) -> Result<Vec<String>> {
        let result = self.query(None, "SHOW USERS")?;
        Ok(result
            .first_series()?
            .map(Series::first_column_values)
            .unwrap_or_default())
    }

    /// Handle on database `name`. Fails on an empty name.
    pub fn select_db(&self, name: &str) -> Result<Database<'_>> {
        log::debug!("[client] select database {}", name);
        Database::new(name, self)
    }

    pub fn admin(&self) -> Admin<'_> {
        Admin::new(self)
    }

    pub fn driver(&self) -> &Arc<dyn WriteDriver> {
        &self.driver
    }

    /// `scheme://host:port`, when built from a connection config.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
