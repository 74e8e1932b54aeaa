//! End-to-end: both HTTP front ends over a real loopback socket.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use latscope_core::TelemetryStore;
use latscope_gateway::{app_state::AppState, config::GatewayConfig, router, transport};

const DATASET: &str = r#"[
    {"region": "us-east", "latency_ms": 100, "uptime_pct": 99.9},
    {"region": "us-east", "latency_ms": 300, "uptime_pct": 99.0},
    {"region": "eu-west", "latency_ms": 80, "uptime_pct": 99.99}
]"#;

#[derive(Clone, Copy, Debug)]
enum Front {
    Framework,
    Raw,
}

const FRONTS: [Front; 2] = [Front::Framework, Front::Raw];

fn state() -> AppState {
    let store = TelemetryStore::from_json_str(DATASET).unwrap();
    AppState::new(GatewayConfig::default(), Arc::new(store))
}

async fn spawn(front: Front) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = state();
    match front {
        Front::Framework => {
            tokio::spawn(async move {
                axum::serve(listener, router::build_router(state)).await.unwrap();
            });
        }
        Front::Raw => {
            tokio::spawn(transport::raw::serve(listener, state, std::future::pending()));
        }
    }
    addr
}

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("{e}: {:?}", self.body))
    }

    fn assert_cors(&self) {
        assert_eq!(self.header("access-control-allow-origin"), Some("*"));
        assert_eq!(self.header("access-control-allow-methods"), Some("POST, OPTIONS"));
        assert_eq!(
            self.header("access-control-allow-headers"),
            Some("Content-Type, Authorization")
        );
    }
}

async fn send(addr: SocketAddr, method: &str, path: &str, body: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    let (head, body) = text.split_once("\r\n\r\n").expect("no header terminator");
    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Reply {
        status,
        headers,
        body: body.to_string(),
    }
}

#[tokio::test]
async fn post_latency_two_point_sample() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(
            addr,
            "POST",
            "/api/latency",
            r#"{"regions": ["us-east", "nowhere", "us-east"], "threshold_ms": 150}"#,
        )
        .await;

        assert_eq!(r.status, 200, "{front:?}");
        r.assert_cors();
        assert_eq!(
            r.json(),
            json!({
                "us-east": {"avg_latency": 200.0, "p95_latency": 290.0, "avg_uptime": 99.45, "breaches": 1},
                "nowhere": {"avg_latency": null, "p95_latency": null, "avg_uptime": null, "breaches": 0}
            }),
            "{front:?}"
        );
    }
}

#[tokio::test]
async fn empty_regions_empty_object() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "POST", "/api/latency", r#"{"regions": [], "threshold_ms": -1}"#).await;
        assert_eq!(r.status, 200, "{front:?}");
        assert_eq!(r.json(), json!({}), "{front:?}");
    }
}

#[tokio::test]
async fn options_preflight_is_empty_200() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "OPTIONS", "/api/latency", "").await;
        assert_eq!(r.status, 200, "{front:?}");
        assert!(r.body.is_empty(), "{front:?}: {:?}", r.body);
        r.assert_cors();
    }
}

#[tokio::test]
async fn malformed_json_is_400_with_cors() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "POST", "/api/latency", "{not json").await;
        assert_eq!(r.status, 400, "{front:?}");
        r.assert_cors();
        let v = r.json();
        assert_eq!(v["code"], "BAD_REQUEST", "{front:?}");
        assert!(v["error"].as_str().unwrap().contains("invalid request json"));
    }
}

#[tokio::test]
async fn missing_field_is_400() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "POST", "/api/latency", r#"{"regions": ["us-east"]}"#).await;
        assert_eq!(r.status, 400, "{front:?}");
        assert!(r.json()["error"].as_str().unwrap().contains("threshold_ms"));
    }
}

#[tokio::test]
async fn unknown_path_is_404_with_cors() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "GET", "/api/nope", "").await;
        assert_eq!(r.status, 404, "{front:?}");
        r.assert_cors();
        assert_eq!(r.json()["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn wrong_method_is_405() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "DELETE", "/api/latency", "").await;
        assert_eq!(r.status, 405, "{front:?}");
        r.assert_cors();
        assert_eq!(r.json()["code"], "METHOD_NOT_ALLOWED");
    }
}

#[tokio::test]
async fn healthz_ok() {
    for front in FRONTS {
        let addr = spawn(front).await;
        let r = send(addr, "GET", "/healthz", "").await;
        assert_eq!(r.status, 200, "{front:?}");
        assert_eq!(r.body, "ok");
    }
}

#[test]
fn missing_dataset_is_fatal() {
    let mut cfg = GatewayConfig::default();
    cfg.dataset.path = "/nonexistent/q-vercel-latency.json".into();
    let err = AppState::from_config(cfg).err().expect("must fail");
    assert_eq!(err.client_code().as_str(), "DATASET_LOAD");
}

#[test]
fn state_shares_one_store() {
    let s = state();
    let cloned = s.clone();
    assert!(Arc::ptr_eq(&s.store(), &cloned.store()));
    assert_eq!(s.store().len(), 3);
}

#[tokio::test]
async fn raw_shutdown_drains_open_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(transport::raw::serve(listener, state(), async move {
        let _ = stop_rx.await;
    }));

    let body = r#"{"regions": ["us-east"], "threshold_ms": 150}"#;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let head = format!(
        "POST /api/latency HTTP/1.1\r\nHost: {addr}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!server.is_finished(), "serve returned with a request in flight");

    stream.write_all(body.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let out = String::from_utf8(raw).unwrap();
    assert!(out.starts_with("HTTP/1.1 200"), "{out:?}");
    assert!(out.contains(r#""breaches":1"#));

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("serve did not finish after draining")
        .unwrap()
        .unwrap();
}
