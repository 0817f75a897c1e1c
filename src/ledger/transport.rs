//! Ledger transport seam
//!
//! The contract is an external, already-deployed collaborator; everything the
//! crate needs from it goes through [`LedgerTransport`]. Production
//! transports bridge to a wallet/RPC provider; tests use
//! [`MockLedger`](crate::testing::MockLedger).

use async_trait::async_trait;

use crate::client::{Error, Signer};

use super::calls::{CallOptions, LedgerCall, LedgerQuery};

/// Handle for a submitted, not-yet-confirmed transaction
///
/// Obtaining one of these means the remote accepted the request, NOT that the
/// state change is durable. Only a successful [`LedgerTransport::confirm`]
/// observes durability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    /// Transaction hash assigned at submission
    pub hash: String,
}

/// Transport to the file-registry contract
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit a mutating call signed by `signer`, returning a pending handle.
    async fn submit(
        &self,
        signer: &Signer,
        call: LedgerCall,
        options: CallOptions,
    ) -> Result<PendingTx, Error>;

    /// Await confirmation of a previously submitted transaction.
    async fn confirm(&self, tx: &PendingTx) -> Result<(), Error>;

    /// Execute a read-only query, returning the decoded response value.
    ///
    /// The shape of the value is query-specific and validated by the caller;
    /// transports pass through whatever the remote returned.
    async fn query(&self, query: LedgerQuery) -> Result<serde_json::Value, Error>;
}
