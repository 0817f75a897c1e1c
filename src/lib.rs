//! DecentraShare Core
//!
//! UI-independent client core for DecentraShare, a decentralized file-sharing
//! application. The authoritative state lives in two external systems: an
//! on-chain file-registry contract (the ledger) and an IPFS pinning provider
//! (the content store). This crate owns the glue between them:
//!
//! - Wallet session lifecycle (connect/disconnect, serialized connects)
//! - Blob upload to a pluggable pinning backend, returning a content id
//! - Typed ledger calls with two-phase submit/confirm semantics
//! - A reconciled local view of "my files" and "files shared with me"
//! - Share/revoke/grant orchestration with confirm-before-refresh ordering
//!
//! # Module Structure
//!
//! - `client/`: Public interface (Client, config, errors, domain types)
//! - `identity`: Wallet-derived addresses
//! - `ledger/`: Ledger call set, transport seam, response decoding
//! - `store/`: Content store backends and gateway URL resolution
//! - `registry`: Cached file listings (full-replace refresh)
//! - `sharing`: Sharing action state machine
//! - `testing`: In-memory ledger and wallet doubles
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use decentrashare_core::{Client, ClientConfig};
//! use decentrashare_core::testing::{MockLedger, MockWallet};
//!
//! let wallet = Arc::new(MockWallet::with_address("0xabcd..."));
//! let ledger = Arc::new(MockLedger::new());
//! let client = Client::new(ClientConfig::for_testing(), wallet, ledger)?;
//!
//! client.connect().await?;
//! let cid = client.upload_file(data, "a.png", "image/png", Default::default(), None).await?;
//! let mine = client.my_files().await;
//! ```

// Public interface
pub mod client;

// Domain and infrastructure modules
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod sharing;
pub mod store;
pub mod testing;

// Re-export main API types for convenience
pub use client::{
    Client, ClientConfig, Error, FileRecord, Recipient, Session, SharedFileView, Signer,
    UploadOptions, WalletProvider, WalletSession,
};
pub use identity::Address;
pub use ledger::{
    CallOptions, LedgerCall, LedgerClient, LedgerQuery, LedgerTransport, PendingTx, RecordParams,
};
pub use registry::RegistryView;
pub use sharing::{ShareAction, ShareOutcome, ShareState, SharingController};
pub use store::{ContentStore, StoreConfig, StoreProvider};
