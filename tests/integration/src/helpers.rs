//! Test transports
//!
//! `MockApi` scripts responses at the `Api` seam for session tests.
//! `TestBackend` is a minimal loopback HTTP server for exercising the real
//! reqwest transport (token refresh, retry behavior).

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use parlor_client::{Api, ApiError, HttpMethod};

/// One request observed by `MockApi`
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted in-process API transport
///
/// Responses are consumed in request order; a request with no scripted
/// response gets `Ok(None)`.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<Option<Value>, ApiError>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, value: Value) {
        self.responses.lock().push_back(Ok(Some(value)));
    }

    pub fn push_empty(&self) {
        self.responses.lock().push_back(Ok(None));
    }

    pub fn push_error(&self, status: u16) {
        self.responses.lock().push_back(Err(ApiError::Http {
            status,
            message: None,
        }));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Api for MockApi {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        self.responses.lock().pop_front().unwrap_or(Ok(None))
    }
}

/// Handler turning `(method, path)` into `(status, json body)`
pub type RouteHandler = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

/// Minimal loopback HTTP/1.1 server
pub struct TestBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<(String, String)>>>,
    accept_task: JoinHandle<()>,
}

impl TestBackend {
    /// Bind an ephemeral port and serve `handler` until dropped
    pub async fn start(handler: Arc<RouteHandler>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let hits: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

        let hit_log = Arc::clone(&hits);
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let hit_log = Arc::clone(&hit_log);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, &handler, &hit_log).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
            accept_task,
        }
    }

    /// Every `(method, path)` pair served so far
    pub fn hits(&self) -> Vec<(String, String)> {
        self.hits.lock().clone()
    }

    /// Number of requests served for `path`
    pub fn hit_count(&self, path: &str) -> usize {
        self.hits.lock().iter().filter(|(_, p)| p == path).count()
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve_connection(
    mut stream: tokio::net::TcpStream,
    handler: &Arc<RouteHandler>,
    hits: &Arc<Mutex<Vec<(String, String)>>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let header_end = loop {
        let mut chunk = [0u8; 1024];
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    // Drain the body so the client can finish writing before we respond
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let mut remaining = (header_end + 4 + content_length).saturating_sub(buffer.len());
    while remaining > 0 {
        let mut chunk = vec![0u8; remaining];
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        remaining -= n;
    }

    hits.lock().push((method.clone(), path.clone()));
    let (status, body) = handler(&method, &path);
    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len(),
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}
