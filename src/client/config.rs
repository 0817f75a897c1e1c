//! Client configuration

use std::fmt;
use std::time::Duration;

use crate::store::{StoreConfig, StoreProvider};

/// Client-side resource cap attached to every mutating ledger call.
///
/// A safety cap, not a protocol requirement.
pub const DEFAULT_GAS_LIMIT: u64 = 5_000_000;

/// Default bound on waiting for transaction confirmation
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the DecentraShare client
#[derive(Clone)]
pub struct ClientConfig {
    /// Resource cap for every mutating ledger call
    /// Default: 5,000,000
    pub gas_limit: u64,

    /// How long to wait for a submitted transaction to confirm before the
    /// pending action settles as failed
    /// Default: 60 seconds
    pub confirmation_timeout: Duration,

    /// Content store backend selection and credentials
    pub store: StoreConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            gas_limit: DEFAULT_GAS_LIMIT,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            store: StoreConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for tests: self-hosted node backend pointing at a local
    /// daemon, short confirmation timeout.
    pub fn for_testing() -> Self {
        ClientConfig {
            gas_limit: DEFAULT_GAS_LIMIT,
            confirmation_timeout: Duration::from_secs(5),
            store: StoreConfig {
                provider: StoreProvider::Node,
                node_api_url: Some("http://127.0.0.1:5001".to_string()),
                ..StoreConfig::default()
            },
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("gas_limit", &self.gas_limit)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .field("store", &self.store)
            .finish()
    }
}
