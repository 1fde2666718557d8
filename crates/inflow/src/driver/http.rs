// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP transport.
//!
//! Writes go to `POST /write` with a line protocol body, queries to
//! `GET /query`, health checks to `GET /ping`. Any non-2xx answer becomes
//! [`TransportError::Http`] carrying the response body, which is where the
//! server puts its error message.

use super::{QueryDriver, WriteDriver};
use crate::config::ConnectionConfig;
use crate::error::{InflowError, Result, TransportError};
use crate::point::{BatchPoints, Point};
use crate::policy::{ConsistencyLevel, RetentionPolicy};
use crate::query::{Query, QueryResult};
use reqwest::blocking::{Client, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Server version header returned by `/ping`.
const VERSION_HEADER: &str = "X-Influxdb-Version";

/// Answer to a ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pong {
    /// Server version, `unknown` if the header is missing.
    pub version: String,
    /// Round trip time of the ping.
    pub response_time: Duration,
}

/// Driver talking to the HTTP API.
pub struct HttpDriver {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    http: Client,
    points_single: AtomicU64,
    points_batched: AtomicU64,
}

impl HttpDriver {
    /// Driver for `base_url` (e.g. `http://localhost:8086`) with default client settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_client(base_url, Client::builder().build()?)
    }

    /// Driver configured from connection settings (timeout, TLS verification, credentials).
    pub fn from_connection(connection: &ConnectionConfig) -> Result<Self> {
        connection.validate()?;
        let http = Client::builder()
            .timeout(connection.timeout())
            .danger_accept_invalid_certs(connection.ssl && !connection.verify_ssl)
            .build()?;

        let mut driver = Self::with_client(connection.base_url(), http)?;
        driver.username = connection.username.clone();
        driver.password = connection.password.clone();
        Ok(driver)
    }

    fn with_client(base_url: impl Into<String>, http: Client) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(InflowError::Config("base URL may not be empty".to_string()));
        }
        Ok(Self {
            base_url,
            username: None,
            password: None,
            http,
            points_single: AtomicU64::new(0),
            points_batched: AtomicU64::new(0),
        })
    }

    /// Authenticate every request with `u`/`p` parameters.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Points written one at a time through [`WriteDriver::write_point`].
    pub fn points_single(&self) -> u64 {
        self.points_single.load(Ordering::Relaxed)
    }

    /// Points written through [`WriteDriver::write_batch`].
    pub fn points_batched(&self) -> u64 {
        self.points_batched.load(Ordering::Relaxed)
    }

    /// Check the server is reachable and report its version.
    pub fn ping(&self) -> Result<Pong> {
        let started = Instant::now();
        let response = self
            .http
            .get(format!("{}/ping", self.base_url))
            .send()
            .map_err(TransportError::Request)?;
        let response = check_status(response)?;

        let version = response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(Pong {
            version,
            response_time: started.elapsed(),
        })
    }

    /// Server version as reported by `/ping`.
    pub fn version(&self) -> Result<String> {
        Ok(self.ping()?.version)
    }

    fn auth_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(username) = &self.username {
            params.push(("u", username.clone()));
        }
        if let Some(password) = &self.password {
            params.push(("p", password.clone()));
        }
    }

    fn post_write(
        &self,
        database: &str,
        retention_policy: &str,
        consistency: ConsistencyLevel,
        body: String,
    ) -> Result<()> {
        let mut params = vec![
            ("db", database.to_string()),
            ("rp", retention_policy.to_string()),
            ("precision", "n".to_string()),
            ("consistency", consistency.as_str().to_string()),
        ];
        self.auth_params(&mut params);

        log::debug!(
            "[http] write {} bytes to {}/{}",
            body.len(),
            database,
            retention_policy
        );

        let response = self
            .http
            .post(format!("{}/write", self.base_url))
            .query(&params)
            .body(body)
            .send()
            .map_err(TransportError::Request)?;
        check_status(response)?;
        Ok(())
    }
}

impl WriteDriver for HttpDriver {
    fn write_batch(&self, batch: &BatchPoints) -> Result<()> {
        self.post_write(
            &batch.database,
            &batch.retention_policy.name,
            batch.consistency,
            batch.line_protocol(),
        )?;
        self.points_batched
            .fetch_add(batch.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn write_records(
        &self,
        database: &str,
        retention_policy: &RetentionPolicy,
        consistency: ConsistencyLevel,
        records: &[String],
    ) -> Result<()> {
        self.post_write(
            database,
            &retention_policy.name,
            consistency,
            records.join("\n"),
        )
    }

    fn write_point(
        &self,
        database: &str,
        retention_policy: &RetentionPolicy,
        point: &Point,
    ) -> Result<()> {
        self.post_write(
            database,
            &retention_policy.name,
            ConsistencyLevel::default(),
            point.line_protocol(),
        )?;
        self.points_single.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn as_query_driver(&self) -> Option<&dyn QueryDriver> {
        Some(self)
    }
}

impl QueryDriver for HttpDriver {
    fn query(&self, query: &Query) -> Result<QueryResult> {
        let mut params = Vec::new();
        self.auth_params(&mut params);
        if let Some(database) = &query.database {
            params.push(("db", database.clone()));
        }
        if let Some(precision) = query.precision {
            params.push(("epoch", precision.as_epoch().to_string()));
        }
        params.push(("q", query.command.clone()));

        let response = self
            .http
            .get(format!("{}/query", self.base_url))
            .query(&params)
            .send()
            .map_err(TransportError::Request)?;
        let response = check_status(response)?;

        Ok(response
            .json::<QueryResult>()
            .map_err(TransportError::Request)?)
    }
}

/// Map a non-2xx response to [`TransportError::Http`].
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(TransportError::Http {
        status: status.as_u16(),
        body: body.trim().to_string(),
    }
    .into())
}
