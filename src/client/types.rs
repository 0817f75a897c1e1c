//! Public domain types
//!
//! The ledger owns every one of these records; the client only requests
//! mutations and mirrors the results. Record identity on chain is the
//! `(owner, index)` pair assigned at creation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::Error;
use crate::identity::Address;

/// A file record held by the ledger
///
/// Immutable once created except for `is_public` (remote toggle) and deletion
/// (the ledger tombstones the index and the record stops appearing in
/// listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Content identifier returned by the content store
    pub content_id: String,
    /// Original file name
    pub file_name: String,
    /// Creation time recorded by the ledger (Unix seconds)
    pub created_at: i64,
    /// The identity that created the record
    pub owner: Address,
    /// Whether the file is publicly visible
    pub is_public: bool,
    /// Free-form description
    pub description: String,
    /// MIME type as reported at upload
    pub file_type: String,
    /// Size in bytes
    pub file_size: u64,
}

/// A file shared with the current identity
///
/// Read-only projection of a [`FileRecord`] combined with its grant. When
/// `has_access` is false the grant was revoked; the projection is an audit
/// artifact and must not appear in accessible-files listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedFileView {
    /// The underlying record
    pub record: FileRecord,
    /// Who shared the file
    pub shared_by: Address,
    /// When the share was created (Unix seconds)
    pub shared_at: i64,
    /// Whether access is currently granted
    pub has_access: bool,
}

/// A recipient of a shared file
///
/// One entry per recipient identity per file. Revocation flips `has_access`
/// rather than removing the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// The recipient identity
    pub address: Address,
    /// Whether access is currently granted
    pub has_access: bool,
}

/// Authorization handle issued by the wallet on connect
///
/// Opaque to this crate apart from the address it signs for. Every mutating
/// ledger call carries one.
#[derive(Debug, Clone)]
pub struct Signer {
    address: Address,
    token: String,
}

impl Signer {
    /// Create a signer for `address` with an opaque provider token.
    pub fn new(address: Address, token: impl Into<String>) -> Self {
        Signer {
            address,
            token: token.into(),
        }
    }

    /// The address this signer acts for.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The opaque provider token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// An active wallet session: the connected identity plus its signer
#[derive(Debug, Clone)]
pub struct Session {
    /// The connected identity
    pub address: Address,
    /// Authorization handle for mutating calls
    pub signer: Signer,
}

/// Result of a successful wallet handshake
#[derive(Debug, Clone)]
pub struct WalletSession {
    /// The account the user approved
    pub address: Address,
    /// Authorization handle bound to that account
    pub signer: Signer,
}

/// External wallet provider
///
/// The handshake pops a prompt in the user's wallet; implementations must
/// surface a pending-prompt collision as [`Error::WalletBusy`] (wallet code
/// `-32002`) so the caller can render an actionable message.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Run the wallet handshake and return the approved session.
    async fn connect(&self) -> Result<WalletSession, Error>;
}

/// Options for record creation
///
/// Defaults mirror the upload form: empty description, publicly visible.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Free-form description stored with the record
    pub description: String,
    /// Initial visibility
    pub is_public: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            description: String::new(),
            is_public: true,
        }
    }
}
