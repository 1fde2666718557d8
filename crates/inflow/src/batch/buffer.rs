// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pending entry buffer guarded by the processor's lock.
//!
//! Every operation here is pure bookkeeping; callers hold the lock only
//! for the duration of one call and dispatch the returned entries after
//! releasing it.

use super::BatchEntry;

/// Buffer of entries waiting for the next flush.
///
/// Entries are drained either when the buffer reaches `actions`
/// (size-based flush) or when the owner asks for everything (timer,
/// manual flush, shutdown). Once closed, the buffer refuses new entries.
pub(crate) struct BatchBuffer {
    entries: Vec<BatchEntry>,
    actions: usize,
    closed: bool,
}

impl BatchBuffer {
    /// Create a buffer that asks for a flush once it holds `actions` entries.
    pub(crate) fn new(actions: usize) -> Self {
        Self {
            entries: Vec::new(),
            actions,
            closed: false,
        }
    }

    /// Append an entry.
    ///
    /// Returns `Ok(Some(batch))` with the whole buffer content if the
    /// threshold was reached, `Ok(None)` if there is still room, and
    /// `Err(entry)` handing the entry back if the buffer is closed.
    pub(crate) fn add(&mut self, entry: BatchEntry) -> Result<Option<Vec<BatchEntry>>, BatchEntry> {
        if self.closed {
            return Err(entry);
        }
        self.entries.push(entry);
        if self.entries.len() >= self.actions {
            Ok(Some(self.drain()))
        } else {
            Ok(None)
        }
    }

    /// Take every buffered entry, leaving the buffer empty.
    pub(crate) fn drain(&mut self) -> Vec<BatchEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Close the buffer and take what is left in it.
    ///
    /// Returns `None` if it was already closed.
    pub(crate) fn close(&mut self) -> Option<Vec<BatchEntry>> {
        if self.closed {
            return None;
        }
        self.closed = true;
        Some(self.drain())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
