// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error and Result types for inflow operations.

use std::io;
use thiserror::Error;

/// A convenience `Result` type for inflow operations.
pub type Result<T> = std::result::Result<T, InflowError>;

/// Failure of a driver to deliver a write or run a query.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body, usually the server's error message.
        body: String,
    },

    /// Connecting, sending, timing out or decoding failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Socket level failure (UDP).
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

/// The error type for inflow operations.
#[derive(Debug, Error)]
pub enum InflowError {
    /// Missing or invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// YAML configuration could not be parsed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A driver write or query failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The batch processor was already shut down.
    #[error("batch processor has been shut down")]
    Shutdown,

    /// The point cannot be written (no fields, empty measurement).
    #[error("invalid point: {0}")]
    Point(String),

    /// The server reported a query error, or the response had no usable result.
    #[error("query error: {0}")]
    Query(String),

    /// The configured driver cannot run queries.
    #[error("current driver does not support query operations")]
    UnsupportedQuery,

    /// Creating a database failed.
    #[error("failed to create database {name}: {source}")]
    Database {
        /// Database name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<InflowError>,
    },

    /// The caller passed an argument the server would reject.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl InflowError {
    /// Whether this error came from the transport (network, status, socket).
    pub fn is_transport(&self) -> bool {
        matches!(self, InflowError::Transport(_))
    }
}

impl From<reqwest::Error> for InflowError {
    fn from(e: reqwest::Error) -> Self {
        InflowError::Transport(TransportError::Request(e))
    }
}
