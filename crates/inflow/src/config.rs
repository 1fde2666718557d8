// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for the client.
//!
//! ```yaml
//! connection:
//!   host: "localhost"
//!   port: 8086
//!   username: "root"
//!   password: "root"
//!   transport: http      # or udp
//! batch:                 # optional, enables batched writes
//!   actions: 500
//!   flush_interval_ms: 1000
//! ```

use crate::error::{InflowError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default HTTP API port.
pub const DEFAULT_HTTP_PORT: u16 = 8086;

/// Default UDP listener port.
pub const DEFAULT_UDP_PORT: u16 = 4444;

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InflowConfig {
    /// Server connection settings.
    pub connection: ConnectionConfig,
    /// Batched write settings. None = every point is written immediately.
    #[serde(default)]
    pub batch: Option<BatchConfig>,
}

/// Which transport carries the writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Udp,
}

/// Server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Server host name or address.
    pub host: String,
    /// HTTP API port.
    #[serde(default = "default_http_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Use https instead of http.
    #[serde(default)]
    pub ssl: bool,
    /// Verify the server certificate when `ssl` is set.
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    /// Request timeout in seconds. 0 = no timeout.
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub transport: Transport,
    /// UDP listener port, used when `transport` is `udp`.
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_udp_port() -> u16 {
    DEFAULT_UDP_PORT
}

fn default_verify_ssl() -> bool {
    true
}

impl ConnectionConfig {
    /// HTTP connection to `host` on the default port, without credentials.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_HTTP_PORT,
            username: None,
            password: None,
            ssl: false,
            verify_ssl: true,
            timeout_secs: 0,
            transport: Transport::Http,
            udp_port: DEFAULT_UDP_PORT,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Switch to https; `verify_ssl` controls certificate verification.
    pub fn ssl(mut self, verify_ssl: bool) -> Self {
        self.ssl = true;
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Write over UDP to `udp_port` instead of HTTP.
    pub fn udp(mut self, udp_port: u16) -> Self {
        self.transport = Transport::Udp;
        self.udp_port = udp_port;
        self
    }

    /// `http` or `https`.
    pub fn scheme(&self) -> &'static str {
        if self.ssl {
            "https"
        } else {
            "http"
        }
    }

    /// `scheme://host:port` of the HTTP API.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Request timeout, None when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(InflowError::Config("connection host is empty".to_string()));
        }
        Ok(())
    }
}

/// Batched write settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Number of buffered points after which a write happens.
    pub actions: usize,
    /// Interval in milliseconds at which buffered points are written.
    pub flush_interval_ms: u64,
}

impl BatchConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.actions == 0 {
            return Err(InflowError::Config("batch.actions must be at least 1".to_string()));
        }
        if self.flush_interval_ms == 0 {
            return Err(InflowError::Config(
                "batch.flush_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl InflowConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: InflowConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;
        if let Some(batch) = &self.batch {
            batch.validate()?;
        }
        Ok(())
    }
}
