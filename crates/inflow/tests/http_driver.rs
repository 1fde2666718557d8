// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP driver integration tests
//!
//! Runs the real driver against an in-process responder and checks the
//! requests it sends and how it reads the answers.

mod common;

use common::{init_logging, CannedResponse, MockServer};
use inflow::{
    BatchPoints, Client, ConnectionConfig, HttpDriver, InflowError, Point, Precision, Query,
    QueryDriver, RetentionPolicy, TransportError, WriteDriver,
};
use std::sync::Arc;
use std::time::Duration;

fn cpu(value: f64, ts: i64) -> Point {
    Point::builder("cpu")
        .tag("host", "a")
        .field("value", value)
        .timestamp(ts)
        .build()
        .expect("point")
}

#[test]
fn test_write_batch_request() {
    init_logging();
    let server = MockServer::start(vec![CannedResponse::no_content()]);
    let driver = HttpDriver::new(server.url())
        .expect("driver")
        .credentials("writer", "pw");

    let mut batch = BatchPoints::new("metrics", RetentionPolicy::new("week"));
    batch.push(cpu(0.5, 1));
    batch.push(cpu(0.7, 2));
    driver.write_batch(&batch).expect("write");

    let requests = server.finish();
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path(), "/write");
    assert!(request.has_param("db=metrics"));
    assert!(request.has_param("rp=week"));
    assert!(request.has_param("precision=n"));
    assert!(request.has_param("consistency=one"));
    assert!(request.has_param("u=writer"));
    assert!(request.has_param("p=pw"));
    assert_eq!(request.body, "cpu,host=a value=0.5 1\ncpu,host=a value=0.7 2");

    assert_eq!(driver.points_batched(), 2);
    assert_eq!(driver.points_single(), 0);
}

#[test]
fn test_write_point_counts_single() {
    let server = MockServer::start(vec![CannedResponse::no_content()]);
    let driver = HttpDriver::new(server.url()).expect("driver");

    driver
        .write_point("metrics", &RetentionPolicy::default(), &cpu(1.0, 3))
        .expect("write");

    let requests = server.finish();
    assert_eq!(requests[0].body, "cpu,host=a value=1 3");
    assert!(requests[0].has_param("rp=default"));
    assert_eq!(driver.points_single(), 1);
}

#[test]
fn test_error_status_carries_body() {
    let server = MockServer::start(vec![CannedResponse::new(
        400,
        r#"{"error":"unable to parse 'cpu value=': missing field value"}"#,
    )]);
    let driver = HttpDriver::new(server.url()).expect("driver");

    let err = driver
        .write_point("metrics", &RetentionPolicy::default(), &cpu(1.0, 1))
        .unwrap_err();
    server.finish();

    match err {
        InflowError::Transport(TransportError::Http { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("unable to parse"));
        }
        other => panic!("expected HTTP error, got: {:?}", other),
    }
    assert_eq!(driver.points_single(), 0);
}

#[test]
fn test_query_request_and_decoding() {
    let server = MockServer::start(vec![CannedResponse::json(
        r#"{"results":[{"statement_id":0,"series":[{"name":"cpu","columns":["time","value"],"values":[[1433601327195,0.5]]}]}]}"#,
    )]);
    let driver = HttpDriver::new(server.url()).expect("driver");

    let query = Query::new("SELECT value FROM cpu", Some("metrics"))
        .with_precision(Precision::Milliseconds);
    let result = driver.query(&query).expect("query");

    let requests = server.finish();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path(), "/query");
    assert!(requests[0].has_param("db=metrics"));
    assert!(requests[0].has_param("epoch=ms"));
    assert!(requests[0].has_param("q=SELECT+value+FROM+cpu"));

    let series = result.first_series().expect("results").expect("series");
    assert_eq!(series.columns, vec!["time", "value"]);
    assert_eq!(series.values[0][1], serde_json::json!(0.5));
}

#[test]
fn test_ping_reads_version_header() {
    let server = MockServer::start(vec![
        CannedResponse::no_content().header("X-Influxdb-Version", "1.8.10")
    ]);
    let driver = HttpDriver::new(server.url()).expect("driver");

    let pong = driver.ping().expect("ping");
    let requests = server.finish();

    assert_eq!(requests[0].path(), "/ping");
    assert_eq!(pong.version, "1.8.10");
    assert!(pong.response_time < Duration::from_secs(5));
}

#[test]
fn test_client_over_http() {
    init_logging();
    let server = MockServer::start(vec![
        CannedResponse::json(r#"{"results":[{"statement_id":0}]}"#),
        CannedResponse::json(
            r#"{"results":[{"series":[{"name":"databases","columns":["name"],"values":[["metrics"]]}]}]}"#,
        ),
        CannedResponse::no_content(),
    ]);

    let connection = ConnectionConfig::new("127.0.0.1")
        .port(server.port())
        .credentials("admin", "secret")
        .timeout_secs(5);
    let mut client = Client::new(&connection).expect("client");
    client
        .enable_batch(100, Duration::from_secs(3600))
        .expect("batching");

    let db = client.select_db("metrics").expect("database");
    db.create(None, true).expect("create");
    assert!(db.exists().expect("exists"));

    db.write_point(cpu(0.1, 1)).expect("buffered");
    db.write_point(cpu(0.2, 2)).expect("buffered");
    client.flush().expect("flush");

    let requests = server.finish();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].has_param("q=CREATE+DATABASE+IF+NOT+EXISTS+metrics"));
    assert!(requests[0].has_param("u=admin"));
    assert!(requests[1].has_param("q=SHOW+DATABASES"));
    assert_eq!(requests[2].path(), "/write");
    assert_eq!(
        requests[2].body,
        "cpu,host=a value=0.1 1\ncpu,host=a value=0.2 2"
    );
}

#[test]
fn test_query_error_in_response() {
    let server = MockServer::start(vec![CannedResponse::json(
        r#"{"results":[{"statement_id":0,"error":"database not found: nope"}]}"#,
    )]);
    let client = Client::with_driver(Arc::new(HttpDriver::new(server.url()).expect("driver")));

    let err = client.query(Some("nope"), "SELECT * FROM cpu").unwrap_err();
    server.finish();

    assert!(matches!(err, InflowError::Query(msg) if msg.contains("database not found")));
}

#[test]
fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port();
    let driver = HttpDriver::new(format!("http://127.0.0.1:{}", port)).expect("driver");

    let err = driver.ping().unwrap_err();
    assert!(matches!(
        err,
        InflowError::Transport(TransportError::Request(_))
    ));
}
