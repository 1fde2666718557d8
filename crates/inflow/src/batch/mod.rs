// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batched point writes.
//!
//! Single point writes from any number of threads are buffered and sent
//! to the driver as grouped batches, one per destination, either when the
//! buffer reaches its action threshold or on a fixed interval.
//!
//! ```text
//! submit --> BatchBuffer --(threshold | timer | flush)--> group_entries --> WriteDriver::write_batch (per destination)
//! ```

mod buffer;
mod processor;

pub use processor::{BatchProcessor, BatchProcessorBuilder, BatchStats};

use crate::point::{BatchPoints, Point};
use crate::policy::RetentionPolicy;
use std::collections::HashMap;

/// One buffered point and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    point: Point,
    database: String,
    retention_policy: RetentionPolicy,
}

impl BatchEntry {
    pub fn new(point: Point, database: impl Into<String>, retention_policy: RetentionPolicy) -> Self {
        Self {
            point,
            database: database.into(),
            retention_policy,
        }
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn retention_policy(&self) -> &RetentionPolicy {
        &self.retention_policy
    }

    /// Grouping key of this entry.
    pub fn destination(&self) -> DestinationKey {
        DestinationKey {
            database: self.database.clone(),
            retention_policy: self.retention_policy.name.clone(),
        }
    }
}

/// `(database, retention policy name)` pair, compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationKey {
    pub database: String,
    pub retention_policy: String,
}

/// Partition drained entries into one batch per destination.
///
/// Every entry lands in exactly one batch. A batch carries the retention
/// policy of the first entry seen for its key.
pub(crate) fn group_entries(entries: Vec<BatchEntry>) -> HashMap<DestinationKey, BatchPoints> {
    let mut groups: HashMap<DestinationKey, BatchPoints> = HashMap::new();

    for entry in entries {
        let key = entry.destination();
        let BatchEntry {
            point,
            database,
            retention_policy,
        } = entry;
        groups
            .entry(key)
            .or_insert_with(|| BatchPoints::new(database, retention_policy))
            .push(point);
    }

    groups
}
