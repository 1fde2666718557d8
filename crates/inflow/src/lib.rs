// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inflow
//!
//! Client for a time-series database speaking line protocol over HTTP
//! (writes and queries) or UDP (writes only).
//!
//! This crate provides:
//! - Points and line protocol rendering
//! - HTTP and UDP transport drivers behind one write trait
//! - Batched writes: a thread-safe buffer flushed on a size threshold,
//!   on a timer and on shutdown, grouped per database and retention policy
//! - Database, retention policy and user administration statements
//! - A `SELECT` query builder
//! - YAML configuration
//!
//! # Overview
//!
//! ```text
//! Client --write_point--> BatchProcessor --grouped BatchPoints--> WriteDriver (HTTP | UDP)
//!    \--query-----------------------------------------------> QueryDriver (HTTP)
//! ```
//!
//! ```rust,no_run
//! use inflow::{Client, ConnectionConfig, Point};
//! use std::time::Duration;
//!
//! # fn main() -> inflow::Result<()> {
//! let mut client = Client::new(&ConnectionConfig::new("localhost"))?;
//! client.enable_batch(500, Duration::from_secs(1))?;
//!
//! let db = client.select_db("metrics")?;
//! db.write_point(Point::builder("cpu").tag("host", "a").field("load", 0.64).build()?)?;
//!
//! client.flush()?;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod batch;
pub mod client;
pub mod config;
pub mod database;
pub mod driver;
pub mod error;
pub mod point;
pub mod policy;
pub mod query;

pub use admin::Admin;
pub use batch::{BatchEntry, BatchProcessor, BatchStats, DestinationKey};
pub use client::Client;
pub use config::{BatchConfig, ConnectionConfig, InflowConfig, Transport};
pub use database::Database;
pub use driver::{HttpDriver, Pong, QueryDriver, UdpDriver, WriteDriver};
pub use error::{InflowError, Result, TransportError};
pub use point::{BatchPoints, FieldValue, Point};
pub use policy::{ConsistencyLevel, RetentionPolicy, UserPrivilege};
pub use query::{Precision, Query, QueryBuilder, QueryResult, Series};
