// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Retention policies, write consistency and user privileges.

use std::fmt;

/// Retention policy name used when a caller does not pick one.
pub const DEFAULT_RETENTION_POLICY: &str = "default";

/// A named data-retention/replication configuration a write is associated with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetentionPolicy {
    /// Policy name.
    pub name: String,
    /// How long data is kept (e.g. `1d`, `4w`, `INF`).
    pub duration: String,
    /// Replication factor.
    pub replication: u32,
    /// Whether this is the database's default policy.
    pub is_default: bool,
}

impl RetentionPolicy {
    /// Create a policy with a one day duration and a replication factor of 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: "1d".to_string(),
            replication: 1,
            is_default: false,
        }
    }

    /// Set the retention duration.
    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    /// Set the replication factor.
    pub fn replication(mut self, replication: u32) -> Self {
        self.replication = replication;
        self
    }

    /// Mark this policy as the database default.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Render a `CREATE` or `ALTER` statement for this policy on `database`.
    pub fn to_query(&self, method: &str, database: &str) -> String {
        let mut query = format!(
            "{} RETENTION POLICY {} ON {} DURATION {} REPLICATION {}",
            method, self.name, database, self.duration, self.replication
        );
        if self.is_default {
            query.push_str(" DEFAULT");
        }
        query
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_POLICY)
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Consistency level for write operations on a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsistencyLevel {
    /// Write succeeds only if it reached all cluster members.
    All,
    /// Write succeeds if it reached any cluster member.
    Any,
    /// Write succeeds if it reached at least one cluster member.
    #[default]
    One,
    /// Write succeeds only if it reached a quorum of cluster members.
    Quorum,
}

impl ConsistencyLevel {
    /// Wire value of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
            Self::One => "one",
            Self::Quorum => "quorum",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privilege granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserPrivilege {
    Read,
    Write,
    All,
}

impl UserPrivilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::All => "ALL",
        }
    }
}

impl fmt::Display for UserPrivilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
