//! Stub IPFS node for tests
//!
//! A minimal HTTP listener that speaks just enough of the node `add` API to
//! exercise the real upload path: read one request, swallow the multipart
//! body, answer with a fixed content id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::trace;

/// Find the end of HTTP headers (position after `\r\n\r\n`)
fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

/// Parse the Content-Length header, if any
fn parse_content_length(headers: &str) -> Option<usize> {
    headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// One-endpoint stub of a self-hosted IPFS node
pub struct StubNodeServer {
    api_url: String,
    requests: Arc<AtomicU64>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubNodeServer {
    /// Bind on an ephemeral local port and answer every `add` request with
    /// `content_id`.
    pub async fn start(content_id: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let api_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(AtomicU64::new(0));

        let body = format!(
            "{{\"Name\":\"upload.bin\",\"Hash\":\"{}\",\"Size\":\"0\"}}",
            content_id
        );
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );

        let counter = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(s) => s,
                    Err(_) => continue,
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let response = response.clone();
                tokio::spawn(async move {
                    if read_request(&mut socket).await {
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                });
            }
        });

        Ok(StubNodeServer {
            api_url,
            requests,
            handle,
        })
    }

    /// Base URL to hand to [`StoreConfig::node_api_url`](crate::store::StoreConfig).
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Number of requests accepted so far.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubNodeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read headers plus the Content-Length-delimited body. Returns false if the
/// peer went away first.
async fn read_request(socket: &mut tokio::net::TcpStream) -> bool {
    let mut buf = Vec::with_capacity(8 * 1024);
    let mut chunk = [0u8; 16 * 1024];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) => return false,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return false,
        }
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = parse_content_length(&headers).unwrap_or(0);
    let mut body_read = buf.len() - header_end;
    while body_read < content_length {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => body_read += n,
            Err(_) => return false,
        }
    }
    trace!(body_bytes = body_read, "stub node request consumed");
    true
}
