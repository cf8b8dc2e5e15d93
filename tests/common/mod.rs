//! Shared utilities for integration testing.

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use routekit::{OutgoingRequest, ResponseEnvelope, Transport, TransportError};
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: BTreeMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request is forwarded on the returned channel before `f` decides
/// the status and body of the reply.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>)
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let _ = tx.send(request.clone());
                        let (status, body) = f(request).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let status_text = format!("{} {}", status, reason);

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a mock backend that always returns a fixed response.
#[allow(dead_code)]
pub async fn start_mock_backend(
    status: u16,
    body: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

/// In-memory transport that records requests and replies with a fixed status.
#[derive(Clone)]
#[allow(dead_code)]
pub struct RecordingTransport {
    pub requests: Arc<Mutex<Vec<OutgoingRequest>>>,
    status: StatusCode,
    body: String,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK, "{}")
    }

    pub fn with_status(status: StatusCode, body: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status,
            body: body.to_string(),
        }
    }

    pub fn recorded(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: OutgoingRequest) -> BoxFuture<'_, Result<ResponseEnvelope, TransportError>> {
        async move {
            let envelope = ResponseEnvelope::new(request.summary(), self.status).with_body(self.body.clone());
            self.requests.lock().unwrap().push(request);
            if self.status.is_success() {
                Ok(envelope)
            } else {
                Err(TransportError::Status(Box::new(envelope)))
            }
        }
        .boxed()
    }
}
