// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared test helpers: a recording driver and a minimal HTTP responder.

#![allow(dead_code)]

use inflow::error::{InflowError, Result, TransportError};
use inflow::{BatchPoints, ConsistencyLevel, FieldValue, Point, RetentionPolicy, WriteDriver};
use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Point `m id=<id>i`, so every submitted point can be traced.
pub fn numbered_point(id: i64) -> Point {
    Point::builder("m")
        .field("id", id)
        .build()
        .expect("valid point")
}

pub fn point_id(point: &Point) -> i64 {
    match point.fields().first() {
        Some((_, FieldValue::Integer(id))) => *id,
        other => panic!("unexpected field: {:?}", other),
    }
}

/// Poll `cond` every 5 ms until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Records every batch it is handed; fails batches for one database on demand.
#[derive(Default)]
pub struct RecordingDriver {
    batches: Mutex<Vec<BatchPoints>>,
    singles: Mutex<Vec<(String, Point)>>,
    fail_database: Mutex<Option<String>>,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, database: &str) {
        *self.fail_database.lock() = Some(database.to_string());
    }

    pub fn batches(&self) -> Vec<BatchPoints> {
        self.batches.lock().clone()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn singles(&self) -> Vec<(String, Point)> {
        self.singles.lock().clone()
    }

    /// Ids of every point written in a batch, in write order.
    pub fn written_ids(&self) -> Vec<i64> {
        self.batches
            .lock()
            .iter()
            .flat_map(|batch| batch.points.iter().map(point_id))
            .collect()
    }

    fn check(&self, database: &str) -> Result<()> {
        if self.fail_database.lock().as_deref() == Some(database) {
            return Err(InflowError::Transport(TransportError::Http {
                status: 500,
                body: format!("{} is down", database),
            }));
        }
        Ok(())
    }
}

impl WriteDriver for RecordingDriver {
    fn write_batch(&self, batch: &BatchPoints) -> Result<()> {
        self.check(&batch.database)?;
        self.batches.lock().push(batch.clone());
        Ok(())
    }

    fn write_records(
        &self,
        database: &str,
        _retention_policy: &RetentionPolicy,
        _consistency: ConsistencyLevel,
        _records: &[String],
    ) -> Result<()> {
        self.check(database)
    }

    fn write_point(
        &self,
        database: &str,
        _retention_policy: &RetentionPolicy,
        point: &Point,
    ) -> Result<()> {
        self.check(database)?;
        self.singles.lock().push((database.to_string(), point.clone()));
        Ok(())
    }
}

/// Response served by [`MockServer`].
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CannedResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn no_content() -> Self {
        Self::new(204, "")
    }

    pub fn json(body: &str) -> Self {
        Self::new(200, body).header("Content-Type", "application/json")
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Request as seen by [`MockServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path with the raw query string.
    pub target: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    /// Whether the query string carries `pair` (e.g. `db=metrics`).
    pub fn has_param(&self, pair: &str) -> bool {
        self.query().split('&').any(|p| p == pair)
    }
}

/// Serves one canned response per connection, in order, then exits.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            for response in responses {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).expect("request line");
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let target = parts.next().unwrap_or_default().to_string();

                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("header line");
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().expect("content length");
                        }
                    }
                }

                let mut body = vec![0u8; content_length];
                reader.read_exact(&mut body).expect("request body");
                recorded.lock().push(RecordedRequest {
                    method,
                    target,
                    body: String::from_utf8(body).expect("utf-8 body"),
                });

                let mut raw = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    response.status,
                    if response.status < 300 { "OK" } else { "Error" },
                    response.body.len()
                );
                for (name, value) in &response.headers {
                    raw.push_str(&format!("{}: {}\r\n", name, value));
                }
                raw.push_str("\r\n");
                raw.push_str(&response.body);

                let mut stream = reader.into_inner();
                stream.write_all(raw.as_bytes()).expect("write response");
                stream.flush().expect("flush response");
            }
        });

        Self {
            addr,
            requests,
            handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Wait until every canned response was served and return the requests.
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("mock server thread");
        }
        self.requests.lock().clone()
    }
}
