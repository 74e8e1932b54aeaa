//! Raw socket adapter: minimal HTTP/1.1 over `tokio::net::TcpStream`.
//!
//! One request per connection (`Connection: close`), `Content-Length`
//! bodies only. Every failure, including malformed framing and socket
//! errors while reading, is answered with the shared JSON error envelope
//! and the CORS headers. There is no access log; connection-level problems
//! are only reported at `debug`.

use std::future::Future;

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use latscope_core::error::{LatscopeError, Result};
use latscope_core::protocol::ErrorBody;
use latscope_core::MetricsRequest;

use crate::app_state::AppState;
use crate::cors::CORS_HEADERS;
use crate::router::{HEALTHZ_PATH, LATENCY_PATH};

/// Upper bound for request line + headers.
const MAX_HEAD_BYTES: usize = 16 * 1024;
const READ_CHUNK: usize = 4096;

#[derive(Debug)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl RawRequest {
    /// Case-insensitive header lookup (first match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path without query string.
    pub fn route_path(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(p, _)| p)
    }
}

#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8"),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| LatscopeError::Internal(format!("encode response failed: {e}")))?;
        Ok(Self {
            status,
            content_type: Some("application/json"),
            body,
        })
    }

    pub fn error(e: &LatscopeError) -> Self {
        Self::json(e.http_status(), &ErrorBody::from(e)).unwrap_or_else(|_| Self {
            status: 500,
            content_type: Some("application/json"),
            body: br#"{"error":"internal","code":"INTERNAL"}"#.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        if let Some(ct) = self.content_type {
            head.push_str(&format!("Content-Type: {ct}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        for (name, value) in CORS_HEADERS {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        _ => "Internal Server Error",
    }
}

/// Accept loop. Runs until `shutdown` resolves, then stops accepting and
/// waits for every open connection to write its response.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let mut conns = JoinSet::new();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            // reap finished connections so the set does not grow unbounded
            Some(_) = conns.join_next(), if !conns.is_empty() => {}
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::debug!(error = %e, "accept failed");
                        continue;
                    }
                };
                let state = state.clone();
                conns.spawn(async move {
                    if let Err(e) = handle_connection(stream, &state).await {
                        tracing::debug!(%peer, error = %e, "raw connection error");
                    }
                });
            }
        }
    }

    drop(listener);
    if !conns.is_empty() {
        tracing::info!(open = conns.len(), "draining raw connections");
    }
    while let Some(res) = conns.join_next().await {
        if let Err(e) = res {
            tracing::debug!(error = %e, "raw connection task failed");
        }
    }
    Ok(())
}

async fn handle_connection(mut stream: TcpStream, state: &AppState) -> std::io::Result<()> {
    let max_body = state.cfg().gateway.max_body_bytes;
    let resp = match read_request(&mut stream, max_body).await {
        Ok(req) => route(&req, state),
        Err(e) => RawResponse::error(&e),
    };
    stream.write_all(&resp.encode()).await?;
    stream.shutdown().await
}

/// Dispatch one parsed request.
pub fn route(req: &RawRequest, state: &AppState) -> RawResponse {
    let result = match (req.method.as_str(), req.route_path()) {
        ("OPTIONS", LATENCY_PATH) => Ok(RawResponse::empty(200)),
        ("POST", LATENCY_PATH) => latency(req, state),
        ("GET", HEALTHZ_PATH) => Ok(RawResponse::text(200, "ok")),
        (method, path @ (LATENCY_PATH | HEALTHZ_PATH)) => Err(LatscopeError::MethodNotAllowed(
            format!("{method} {path}"),
        )),
        (_, path) => Err(LatscopeError::NotFound(path.to_string())),
    };
    result.unwrap_or_else(|e| RawResponse::error(&e))
}

fn latency(req: &RawRequest, state: &AppState) -> Result<RawResponse> {
    let parsed = MetricsRequest::from_slice(&req.body)?;
    RawResponse::json(200, &state.metrics(&parsed))
}

/// Read request head and a `Content-Length` body from `io`.
pub async fn read_request<R>(io: &mut R, max_body: usize) -> Result<RawRequest>
where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    let head_end = loop {
        if let Some(pos) = find_head_end(&buf) {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(LatscopeError::BadRequest("request head too large".into()));
        }
        if read_more(io, &mut buf).await? == 0 {
            return Err(LatscopeError::BadRequest(
                "connection closed before request head was complete".into(),
            ));
        }
    };

    let head = buf.split_to(head_end + 4);
    let (method, path, headers) = parse_head(&head[..head_end])?;

    let mut req = RawRequest {
        method,
        path,
        headers,
        body: Bytes::new(),
    };

    if req
        .header("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    {
        return Err(LatscopeError::BadRequest(
            "chunked request bodies are not supported".into(),
        ));
    }

    let len = match req.header("content-length") {
        Some(v) => v.trim().parse::<usize>().map_err(|_| {
            LatscopeError::BadRequest(format!("invalid Content-Length: {v}"))
        })?,
        None => 0,
    };
    if len > max_body {
        return Err(LatscopeError::PayloadTooLarge);
    }

    while buf.len() < len {
        if read_more(io, &mut buf).await? == 0 {
            return Err(LatscopeError::BadRequest(format!(
                "body truncated: expected {len} bytes, got {}",
                buf.len()
            )));
        }
    }
    buf.truncate(len);
    req.body = buf.freeze();
    Ok(req)
}

async fn read_more<R>(io: &mut R, buf: &mut BytesMut) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    buf.reserve(READ_CHUNK);
    io.read_buf(buf)
        .await
        .map_err(|e| LatscopeError::Internal(format!("read failed: {e}")))
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

type Head = (String, String, Vec<(String, String)>);

/// Parse request line and header lines (without the trailing blank line).
pub fn parse_head(head: &[u8]) -> Result<Head> {
    let text = std::str::from_utf8(head)
        .map_err(|_| LatscopeError::BadRequest("request head is not valid utf-8".into()))?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, path, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(p), Some(v), None) => (m, p, v),
        _ => {
            return Err(LatscopeError::BadRequest(format!(
                "malformed request line: {request_line:?}"
            )))
        }
    };
    if !version.starts_with("HTTP/1.") {
        return Err(LatscopeError::BadRequest(format!(
            "unsupported http version: {version}"
        )));
    }

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line.split_once(':').ok_or_else(|| {
            LatscopeError::BadRequest(format!("malformed header line: {line:?}"))
        })?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok((method.to_string(), path.to_string(), headers))
}
