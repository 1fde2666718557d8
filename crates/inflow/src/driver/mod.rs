// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport drivers.
//!
//! A driver delivers points to the server. The batching engine and the
//! client only ever see `dyn WriteDriver`; whether the points travel over
//! HTTP or UDP is decided once, when the driver is built.

mod http;
mod udp;

pub use http::{HttpDriver, Pong};
pub use udp::{UdpDriver, MAX_DATAGRAM_SIZE};

use crate::error::Result;
use crate::point::{BatchPoints, Point};
use crate::policy::{ConsistencyLevel, RetentionPolicy};
use crate::query::{Query, QueryResult};

/// Write side of a transport.
///
/// Implementations must tolerate concurrent calls: one flush may overlap
/// with a direct write or with another flush.
pub trait WriteDriver: Send + Sync {
    /// Write a grouped batch in one transport call.
    fn write_batch(&self, batch: &BatchPoints) -> Result<()>;

    /// Write pre-rendered line protocol records.
    fn write_records(
        &self,
        database: &str,
        retention_policy: &RetentionPolicy,
        consistency: ConsistencyLevel,
        records: &[String],
    ) -> Result<()>;

    /// Write a single point outside the batching path.
    ///
    /// The default sends a batch of one.
    fn write_point(
        &self,
        database: &str,
        retention_policy: &RetentionPolicy,
        point: &Point,
    ) -> Result<()> {
        let mut batch = BatchPoints::new(database, retention_policy.clone());
        batch.push(point.clone());
        self.write_batch(&batch)
    }

    /// Query side of this transport, if it has one.
    fn as_query_driver(&self) -> Option<&dyn QueryDriver> {
        None
    }
}

/// Query side of a transport.
pub trait QueryDriver: Send + Sync {
    fn query(&self, query: &Query) -> Result<QueryResult>;
}
