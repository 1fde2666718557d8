// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UDP transport.
//!
//! Fire-and-forget writes to the server's UDP listener. The listener is
//! bound to one database and retention policy on the server side, so the
//! destination of a batch is not carried on the wire. There is no query
//! side.

use super::WriteDriver;
use crate::error::{InflowError, Result, TransportError};
use crate::point::{BatchPoints, Point};
use crate::policy::{ConsistencyLevel, RetentionPolicy};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};

/// Largest datagram payload sent. Keeps clear of the 65,507 byte IPv4 limit.
pub const MAX_DATAGRAM_SIZE: usize = 64_000;

/// Driver sending line protocol datagrams.
pub struct UdpDriver {
    socket: UdpSocket,
    target: SocketAddr,
    datagrams_sent: AtomicU64,
}

impl UdpDriver {
    /// Resolve `host:port` and open an ephemeral local socket of the same family.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let target = (host, port)
            .to_socket_addrs()
            .map_err(TransportError::Io)?
            .next()
            .ok_or_else(|| InflowError::Config(format!("cannot resolve {}:{}", host, port)))?;

        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).map_err(TransportError::Io)?;

        log::debug!("[udp] sending to {} from {:?}", target, socket.local_addr().ok());

        Ok(Self {
            socket,
            target,
            datagrams_sent: AtomicU64::new(0),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Datagrams sent so far.
    pub fn datagrams_sent(&self) -> u64 {
        self.datagrams_sent.load(Ordering::Relaxed)
    }

    fn send_lines(&self, lines: &[String]) -> Result<()> {
        for datagram in pack_datagrams(lines, MAX_DATAGRAM_SIZE) {
            self.socket
                .send_to(datagram.as_bytes(), self.target)
                .map_err(TransportError::Io)?;
            self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

impl WriteDriver for UdpDriver {
    fn write_batch(&self, batch: &BatchPoints) -> Result<()> {
        self.send_lines(&batch.lines())
    }

    fn write_records(
        &self,
        _database: &str,
        _retention_policy: &RetentionPolicy,
        _consistency: ConsistencyLevel,
        records: &[String],
    ) -> Result<()> {
        self.send_lines(records)
    }

    fn write_point(
        &self,
        _database: &str,
        _retention_policy: &RetentionPolicy,
        point: &Point,
    ) -> Result<()> {
        self.send_lines(&[point.line_protocol()])
    }
}

/// Join lines with `\n` into payloads of at most `max` bytes.
///
/// Lines are never split; a single line longer than `max` goes out alone.
pub(crate) fn pack_datagrams(lines: &[String], max: usize) -> Vec<String> {
    let mut datagrams = Vec::new();
    let mut current = String::new();

    for line in lines {
        if !current.is_empty() && current.len() + 1 + line.len() > max {
            datagrams.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        datagrams.push(current);
    }
    datagrams
}
