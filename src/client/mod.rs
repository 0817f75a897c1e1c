//! Client: session lifecycle and the public operation surface
//!
//! The [`Client`] is the single entry point: it owns the wallet session,
//! the ledger and content store clients, the listing caches, and the
//! sharing state machine, and exposes the file operations callers use.

mod config;
mod core;
mod error;
mod types;

pub use config::{ClientConfig, DEFAULT_GAS_LIMIT};
pub use core::Client;
pub use error::Error;
pub use types::{
    FileRecord, Recipient, Session, SharedFileView, Signer, UploadOptions, WalletProvider,
    WalletSession,
};
