//! Typed ledger call set
//!
//! One variant per remote procedure of the file-registry contract. The
//! contract ABI is fixed and externally defined; these types are the only
//! shape the rest of the crate speaks.

use serde::{Deserialize, Serialize};

use crate::identity::Address;

/// Parameters for record creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordParams {
    /// Content identifier from the content store
    pub content_id: String,
    /// Original file name
    pub file_name: String,
    /// Free-form description
    pub description: String,
    /// MIME type
    pub file_type: String,
    /// Size in bytes
    pub file_size: u64,
    /// Initial visibility
    pub is_public: bool,
}

/// A mutating contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCall {
    /// Create a file record (`uploadFile`)
    UploadFile(RecordParams),
    /// Tombstone a record (`deleteFile`)
    DeleteFile { index: u64 },
    /// Flip a record's visibility (`toggleFileVisibility`); the current
    /// value is flipped remotely, there is no explicit target
    ToggleVisibility { index: u64 },
    /// Create a grant for a recipient (`shareFile`)
    ShareFile { recipient: Address, index: u64 },
    /// Flip an existing grant off (`revokeAccess`)
    RevokeAccess { recipient: Address, index: u64 },
    /// Flip an existing grant back on (`grantAccess`)
    GrantAccess { recipient: Address, index: u64 },
}

impl LedgerCall {
    /// The contract function name this call maps to.
    pub fn method(&self) -> &'static str {
        match self {
            LedgerCall::UploadFile(_) => "uploadFile",
            LedgerCall::DeleteFile { .. } => "deleteFile",
            LedgerCall::ToggleVisibility { .. } => "toggleFileVisibility",
            LedgerCall::ShareFile { .. } => "shareFile",
            LedgerCall::RevokeAccess { .. } => "revokeAccess",
            LedgerCall::GrantAccess { .. } => "grantAccess",
        }
    }
}

/// A read-only contract query
///
/// `SharedFileRecipients` has no explicit user in the contract ABI; the
/// contract scopes it to the calling account, so the caller's address travels
/// with the query for transports to bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerQuery {
    /// All records owned by `user` (`getUserFiles`)
    UserFiles { user: Address },
    /// All share projections targeting `user` (`getSharedFiles`)
    SharedFiles { user: Address },
    /// Recipients of the caller's file at `index` (`getSharedFileRecipients`)
    SharedFileRecipients { owner: Address, index: u64 },
}

impl LedgerQuery {
    /// The contract function name this query maps to.
    pub fn method(&self) -> &'static str {
        match self {
            LedgerQuery::UserFiles { .. } => "getUserFiles",
            LedgerQuery::SharedFiles { .. } => "getSharedFiles",
            LedgerQuery::SharedFileRecipients { .. } => "getSharedFileRecipients",
        }
    }
}

/// Per-call options for mutating submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Upper resource bound attached to the transaction
    pub gas_limit: u64,
}
