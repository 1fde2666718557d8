// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batch processor: concurrent buffer, grouped dispatch and flush timer.
//!
//! # Delivery semantics
//!
//! A flush drains the whole buffer under the lock, then writes one batch
//! per destination with the lock released. Each destination is written at
//! most once per flush and nothing is retried. If a destination fails,
//! the remaining destinations of the same flush are still written and the
//! first failure is returned; destinations already written are not rolled
//! back. There is no atomicity across destinations.
//!
//! Flushes triggered by `submit` (threshold), `flush` and `shutdown`
//! report failures to their caller. Timer flushes only log them.

use super::buffer::BatchBuffer;
use super::{group_entries, BatchEntry};
use crate::driver::WriteDriver;
use crate::error::{InflowError, Result};
use crate::point::Point;
use crate::policy::RetentionPolicy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Snapshot of processor counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Entries accepted by `submit`.
    pub points_submitted: u64,
    /// Non-empty flushes run (any trigger).
    pub flushes: u64,
    /// Destination batches handed to the driver successfully.
    pub batches_written: u64,
    /// Entries contained in successfully written batches.
    pub points_written: u64,
    /// Destination batches the driver rejected.
    pub batches_failed: u64,
}

#[derive(Default)]
struct Counters {
    points_submitted: AtomicU64,
    flushes: AtomicU64,
    batches_written: AtomicU64,
    points_written: AtomicU64,
    batches_failed: AtomicU64,
}

/// State shared between the processor handle and its timer thread.
struct Shared {
    buffer: Mutex<BatchBuffer>,
    driver: Arc<dyn WriteDriver>,
    counters: Counters,
}

impl Shared {
    /// Drain and dispatch whatever is buffered. Used by the timer.
    fn flush_pending(&self) -> Result<()> {
        let entries = self.buffer.lock().drain();
        self.dispatch(entries)
    }

    /// Group drained entries by destination and write each group once.
    fn dispatch(&self, entries: Vec<BatchEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        self.counters.flushes.fetch_add(1, Ordering::Relaxed);
        let total = entries.len();
        let groups = group_entries(entries);
        log::debug!(
            "[batch] flushing {} points in {} batches",
            total,
            groups.len()
        );

        let mut first_error: Option<InflowError> = None;
        for (key, batch) in groups {
            match self.driver.write_batch(&batch) {
                Ok(()) => {
                    self.counters.batches_written.fetch_add(1, Ordering::Relaxed);
                    self.counters
                        .points_written
                        .fetch_add(batch.len() as u64, Ordering::Relaxed);
                }
                Err(e) => {
                    self.counters.batches_failed.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "[batch] write of {} points to {}/{} failed: {}",
                        batch.len(),
                        key.database,
                        key.retention_policy,
                        e
                    );
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Background thread flushing the buffer at a fixed interval.
///
/// Dropping the sender wakes the thread out of `recv_timeout` with
/// `Disconnected`; it then exits and is joined.
struct FlushTimer {
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FlushTimer {
    fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("inflow-batch-flush".to_string())
            .spawn(move || {
                log::debug!("[batch] flush timer started with interval {:?}", interval);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                    }

                    if let Err(e) = shared.flush_pending() {
                        log::error!("[batch] scheduled flush failed: {}", e);
                    }
                }
                log::debug!("[batch] flush timer stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    fn stop(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("[batch] flush timer thread panicked");
            }
        }
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Collects single point writes from any thread and writes them as
/// grouped batches.
///
/// A flush happens when the buffer reaches the action threshold (inside
/// the `submit` call that crossed it), every flush interval (background
/// thread), on [`flush`](Self::flush), and once more on
/// [`shutdown`](Self::shutdown). After shutdown the processor is terminal.
///
/// Dropping a processor that was not shut down performs the shutdown and
/// logs a failure of its final flush.
pub struct BatchProcessor {
    shared: Arc<Shared>,
    timer: Mutex<Option<FlushTimer>>,
    actions: usize,
    flush_interval: Duration,
}

impl BatchProcessor {
    /// Start configuring a processor. Driver, actions and interval are all required.
    pub fn builder() -> BatchProcessorBuilder {
        BatchProcessorBuilder::default()
    }

    /// Buffer one entry.
    ///
    /// If the buffer reaches the action threshold, the whole buffer is
    /// flushed before this returns and a failure of that flush is returned
    /// here. This call can therefore block on network I/O.
    pub fn submit(&self, entry: BatchEntry) -> Result<()> {
        let full = self
            .shared
            .buffer
            .lock()
            .add(entry)
            .map_err(|_| InflowError::Shutdown)?;
        self.shared
            .counters
            .points_submitted
            .fetch_add(1, Ordering::Relaxed);

        match full {
            Some(entries) => self.shared.dispatch(entries),
            None => Ok(()),
        }
    }

    /// Buffer a point for `database` under `retention_policy`.
    pub fn write(
        &self,
        point: Point,
        database: impl Into<String>,
        retention_policy: RetentionPolicy,
    ) -> Result<()> {
        self.submit(BatchEntry::new(point, database, retention_policy))
    }

    /// Flush everything buffered right now. An empty buffer does not reach the driver.
    pub fn flush(&self) -> Result<()> {
        let entries = {
            let mut buffer = self.shared.buffer.lock();
            if buffer.is_closed() {
                return Err(InflowError::Shutdown);
            }
            buffer.drain()
        };
        self.shared.dispatch(entries)
    }

    /// Flush one last time and stop the timer.
    ///
    /// The processor stops accepting entries first, so nothing can slip in
    /// after the final flush. The timer is stopped even if that flush
    /// fails; its error is returned. A second call fails with
    /// [`InflowError::Shutdown`].
    pub fn shutdown(&self) -> Result<()> {
        let remaining = self
            .shared
            .buffer
            .lock()
            .close()
            .ok_or(InflowError::Shutdown)?;

        log::debug!("[batch] shutting down with {} buffered points", remaining.len());
        let result = self.shared.dispatch(remaining);

        if let Some(mut timer) = self.timer.lock().take() {
            timer.stop();
        }

        result
    }

    /// Number of entries waiting for the next flush.
    pub fn len(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.buffer.lock().is_empty()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.buffer.lock().is_closed()
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn stats(&self) -> BatchStats {
        let c = &self.shared.counters;
        BatchStats {
            points_submitted: c.points_submitted.load(Ordering::Relaxed),
            flushes: c.flushes.load(Ordering::Relaxed),
            batches_written: c.batches_written.load(Ordering::Relaxed),
            points_written: c.points_written.load(Ordering::Relaxed),
            batches_failed: c.batches_failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for BatchProcessor {
    fn drop(&mut self) {
        if self.is_shutdown() {
            return;
        }
        if let Err(e) = self.shutdown() {
            log::error!("[batch] final flush on drop failed: {}", e);
        }
    }
}

/// Builder for [`BatchProcessor`].
#[derive(Default)]
pub struct BatchProcessorBuilder {
    driver: Option<Arc<dyn WriteDriver>>,
    actions: Option<usize>,
    flush_interval: Option<Duration>,
}

impl BatchProcessorBuilder {
    /// Driver receiving the grouped batches.
    pub fn driver(mut self, driver: Arc<dyn WriteDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Number of buffered points after which a write must happen.
    pub fn actions(mut self, actions: usize) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Interval at which buffered points are written regardless of count.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Validate the configuration and start the processor's flush timer.
    pub fn build(self) -> Result<BatchProcessor> {
        let driver = self
            .driver
            .ok_or_else(|| InflowError::Config("batch processor requires a driver".to_string()))?;
        let actions = self
            .actions
            .ok_or_else(|| InflowError::Config("actions may not be empty".to_string()))?;
        let flush_interval = self
            .flush_interval
            .ok_or_else(|| InflowError::Config("flush interval may not be empty".to_string()))?;

        if actions == 0 {
            return Err(InflowError::Config("actions must be at least 1".to_string()));
        }
        if flush_interval.is_zero() {
            return Err(InflowError::Config(
                "flush interval must be greater than zero".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            buffer: Mutex::new(BatchBuffer::new(actions)),
            driver,
            counters: Counters::default(),
        });
        let timer = FlushTimer::spawn(shared.clone(), flush_interval)?;

        log::debug!(
            "[batch] processor started (actions={}, interval={:?})",
            actions,
            flush_interval
        );

        Ok(BatchProcessor {
            shared,
            timer: Mutex::new(Some(timer)),
            actions,
            flush_interval,
        })
    }
}
