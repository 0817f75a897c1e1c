//! Content store backend selection
//!
//! Three interchangeable pinning backends, chosen once at configuration load.
//! Missing credentials are a [`NotConfigured`](Error::NotConfigured) failure
//! at selection time, never a network error later.

use std::fmt;
use std::str::FromStr;

use crate::client::Error;

/// Default public gateway used when no gateway URL is configured
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs/";

/// Default upload size limit (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Which pinning provider to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreProvider {
    /// Pinata pinning service (API key + secret)
    Pinata,
    /// Web3.Storage pinning service (bearer token)
    Web3Storage,
    /// Self-hosted IPFS node (API URL)
    Node,
}

impl FromStr for StoreProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pinata" => Ok(StoreProvider::Pinata),
            "web3storage" => Ok(StoreProvider::Web3Storage),
            "custom" | "node" => Ok(StoreProvider::Node),
            other => Err(Error::InvalidArgument(format!(
                "unsupported content store provider: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreProvider::Pinata => write!(f, "pinata"),
            StoreProvider::Web3Storage => write!(f, "web3storage"),
            StoreProvider::Node => write!(f, "node"),
        }
    }
}

/// Content store configuration
///
/// Only the credentials for the selected provider are required.
#[derive(Clone)]
pub struct StoreConfig {
    /// Selected provider
    /// Default: Pinata
    pub provider: StoreProvider,

    /// Pinata API key (required for the Pinata provider)
    pub pinata_api_key: Option<String>,

    /// Pinata secret key (required for the Pinata provider)
    pub pinata_secret_key: Option<String>,

    /// Web3.Storage bearer token (required for the Web3.Storage provider)
    pub web3_storage_token: Option<String>,

    /// Self-hosted node API URL, e.g. `http://127.0.0.1:5001`
    /// (required for the node provider)
    pub node_api_url: Option<String>,

    /// Gateway base URL for retrieval
    /// Default: `https://gateway.pinata.cloud/ipfs/`
    pub gateway_url: Option<String>,

    /// Maximum upload size in bytes
    /// Default: 100 MiB
    pub max_upload_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            provider: StoreProvider::Pinata,
            pinata_api_key: None,
            pinata_secret_key: None,
            web3_storage_token: None,
            node_api_url: None,
            gateway_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("provider", &self.provider)
            .field("pinata_api_key", &self.pinata_api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "pinata_secret_key",
                &self.pinata_secret_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "web3_storage_token",
                &self.web3_storage_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("node_api_url", &self.node_api_url)
            .field("gateway_url", &self.gateway_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// A fully-resolved backend: provider plus the credentials it needs
#[derive(Debug, Clone)]
pub(crate) enum Backend {
    Pinata { api_key: String, secret_key: String },
    Web3Storage { token: String },
    Node { api_url: String },
}

impl Backend {
    /// Resolve a backend from config, checking credentials eagerly.
    pub(crate) fn from_config(config: &StoreConfig) -> Result<Backend, Error> {
        match config.provider {
            StoreProvider::Pinata => {
                let api_key = config.pinata_api_key.clone().ok_or_else(|| {
                    Error::NotConfigured("Pinata API key not set".to_string())
                })?;
                let secret_key = config.pinata_secret_key.clone().ok_or_else(|| {
                    Error::NotConfigured("Pinata secret key not set".to_string())
                })?;
                Ok(Backend::Pinata { api_key, secret_key })
            }
            StoreProvider::Web3Storage => {
                let token = config.web3_storage_token.clone().ok_or_else(|| {
                    Error::NotConfigured("Web3.Storage token not set".to_string())
                })?;
                Ok(Backend::Web3Storage { token })
            }
            StoreProvider::Node => {
                let api_url = config.node_api_url.clone().ok_or_else(|| {
                    Error::NotConfigured("IPFS node API URL not set".to_string())
                })?;
                Ok(Backend::Node {
                    api_url: api_url.trim_end_matches('/').to_string(),
                })
            }
        }
    }
}
