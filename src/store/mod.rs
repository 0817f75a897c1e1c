//! Content store client
//!
//! Uploads opaque byte blobs to a remote content-addressed store and returns
//! the content identifier. Three interchangeable backends (Pinata,
//! Web3.Storage, self-hosted IPFS node) sit behind one `upload` operation;
//! the backend is resolved once at configuration load.
//!
//! Retrieval never goes through this client: [`ContentStore::resolve`] is a
//! pure string operation that prepends the configured gateway base.

mod backend;
mod node;
mod pinata;
mod web3storage;

pub use backend::{StoreConfig, StoreProvider, DEFAULT_GATEWAY_URL, DEFAULT_MAX_UPLOAD_BYTES};

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use crate::client::Error;
use backend::Backend;

/// Upload progress callback. Receives percentages in `[0, 100]`,
/// non-decreasing across calls.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Stream chunk size for uploads (64 KiB)
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// File metadata accompanying an upload
#[derive(Debug, Clone)]
pub(crate) struct UploadMeta {
    pub(crate) file_name: String,
    pub(crate) file_type: String,
    pub(crate) size: u64,
}

/// Client for the selected content store backend
#[derive(Debug)]
pub struct ContentStore {
    backend: Backend,
    gateway_url: String,
    max_upload_bytes: u64,
    http: reqwest::Client,
    /// Network attempts made so far; observable so callers can assert that
    /// local precondition failures never reach the wire.
    attempts: AtomicU64,
}

impl ContentStore {
    /// Resolve the backend from config.
    ///
    /// Fails with [`Error::NotConfigured`] if the selected provider's
    /// credentials or URL are absent.
    pub fn from_config(config: &StoreConfig) -> Result<Self, Error> {
        let backend = Backend::from_config(config)?;
        let gateway_url = config
            .gateway_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        debug!(provider = %config.provider, gateway = %gateway_url, "content store configured");
        Ok(ContentStore {
            backend,
            gateway_url,
            max_upload_bytes: config.max_upload_bytes,
            http: reqwest::Client::new(),
            attempts: AtomicU64::new(0),
        })
    }

    /// Upload a blob and return its content identifier.
    ///
    /// Rejects with [`Error::SizeExceeded`] before any network activity when
    /// the payload is over the configured limit. `progress`, when provided,
    /// receives monotonically non-decreasing percentages as the body streams.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        file_type: &str,
        progress: Option<ProgressFn>,
    ) -> Result<String, Error> {
        let size = bytes.len() as u64;
        if size > self.max_upload_bytes {
            return Err(Error::SizeExceeded {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let meta = UploadMeta {
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            size,
        };
        let body = progress_body(bytes, progress);

        self.attempts.fetch_add(1, Ordering::Relaxed);
        let content_id = match &self.backend {
            Backend::Pinata { api_key, secret_key } => {
                pinata::upload(&self.http, api_key, secret_key, &meta, body).await?
            }
            Backend::Web3Storage { token } => {
                web3storage::upload(&self.http, token, &meta, body).await?
            }
            Backend::Node { api_url } => node::upload(&self.http, api_url, &meta, body).await?,
        };

        info!(
            content_id = %content_id,
            file = %meta.file_name,
            size = size,
            "blob pinned"
        );
        Ok(content_id)
    }

    /// Resolve a content identifier to a retrieval URL.
    ///
    /// Pure string formatting; never a network call, stable across repeated
    /// calls with the same input.
    pub fn resolve(&self, content_id: &str) -> String {
        format!("{}{}", self.gateway_url, content_id)
    }

    /// Number of network attempts made by this store so far.
    pub fn network_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

/// Monotonic progress reporter shared by the streaming body
struct ProgressReporter {
    total: u64,
    sent: AtomicU64,
    last_pct: AtomicU8,
    sink: ProgressFn,
}

impl ProgressReporter {
    fn new(total: u64, sink: ProgressFn) -> Self {
        ProgressReporter {
            total: total.max(1),
            sent: AtomicU64::new(0),
            last_pct: AtomicU8::new(0),
            sink,
        }
    }

    /// Record `n` more bytes sent; report the new percentage if it advanced.
    fn advance(&self, n: u64) {
        let sent = self.sent.fetch_add(n, Ordering::Relaxed) + n;
        let pct = ((sent.min(self.total) * 100) / self.total) as u8;
        let prev = self.last_pct.fetch_max(pct, Ordering::Relaxed);
        if pct > prev {
            (self.sink)(pct);
        }
    }
}

/// Build a streaming request body that reports progress as chunks are sent.
fn progress_body(bytes: Vec<u8>, progress: Option<ProgressFn>) -> reqwest::Body {
    let total = bytes.len();
    let buf = Bytes::from(bytes);
    let reporter = progress.map(|sink| Arc::new(ProgressReporter::new(total as u64, sink)));

    let chunks: Vec<Bytes> = (0..total)
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|offset| buf.slice(offset..(offset + UPLOAD_CHUNK_SIZE).min(total)))
        .collect();

    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        if let Some(reporter) = &reporter {
            reporter.advance(chunk.len() as u64);
        }
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(stream)
}

/// Extract the content id from a provider response, by key.
pub(crate) fn extract_content_id(
    value: &serde_json::Value,
    key: &str,
    provider: &str,
) -> Result<String, Error> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::Store(format!("unexpected {} response: {}", provider, value)))
}
