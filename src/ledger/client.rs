//! Ledger client
//!
//! One operation per remote procedure. Mutations are two-phase: `submit_*`
//! obtains a [`PendingTx`]; [`LedgerClient::confirm`] awaits durability under
//! the configured timeout. Reads degrade to empty listings on malformed
//! responses instead of propagating.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::{Error, FileRecord, Recipient, SharedFileView, Signer};
use crate::identity::Address;

use super::calls::{CallOptions, LedgerCall, LedgerQuery, RecordParams};
use super::decode;
use super::transport::{LedgerTransport, PendingTx};

/// Client for the file-registry contract
pub struct LedgerClient {
    transport: Arc<dyn LedgerTransport>,
    gas_limit: u64,
    confirmation_timeout: Duration,
}

impl LedgerClient {
    /// Wrap a transport with the configured resource cap and confirmation bound.
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        gas_limit: u64,
        confirmation_timeout: Duration,
    ) -> Self {
        LedgerClient {
            transport,
            gas_limit,
            confirmation_timeout,
        }
    }

    fn options(&self) -> CallOptions {
        CallOptions {
            gas_limit: self.gas_limit,
        }
    }

    // ========================================================================
    // Mutations (two-phase)
    // ========================================================================

    /// Submit a record-creation call.
    ///
    /// Fails fast with [`Error::InvalidArgument`] if the file name or content
    /// id is empty; no remote call is made in that case.
    pub async fn submit_record(
        &self,
        signer: &Signer,
        params: RecordParams,
    ) -> Result<PendingTx, Error> {
        if params.file_name.trim().is_empty() {
            return Err(Error::InvalidArgument("file name must not be empty".to_string()));
        }
        if params.content_id.trim().is_empty() {
            return Err(Error::InvalidArgument("content id must not be empty".to_string()));
        }
        self.submit(signer, LedgerCall::UploadFile(params)).await
    }

    /// Submit a record-deletion call (tombstones the index).
    pub async fn remove_record(&self, signer: &Signer, index: u64) -> Result<PendingTx, Error> {
        self.submit(signer, LedgerCall::DeleteFile { index }).await
    }

    /// Submit a visibility toggle; the current value is flipped remotely.
    pub async fn set_visibility(&self, signer: &Signer, index: u64) -> Result<PendingTx, Error> {
        self.submit(signer, LedgerCall::ToggleVisibility { index }).await
    }

    /// Submit a share call, creating a grant for `recipient`.
    pub async fn share(
        &self,
        signer: &Signer,
        recipient: &Address,
        index: u64,
    ) -> Result<PendingTx, Error> {
        self.submit(
            signer,
            LedgerCall::ShareFile {
                recipient: recipient.clone(),
                index,
            },
        )
        .await
    }

    /// Submit a revoke call, flipping `recipient`'s grant off.
    pub async fn revoke(
        &self,
        signer: &Signer,
        recipient: &Address,
        index: u64,
    ) -> Result<PendingTx, Error> {
        self.submit(
            signer,
            LedgerCall::RevokeAccess {
                recipient: recipient.clone(),
                index,
            },
        )
        .await
    }

    /// Submit a grant call, flipping `recipient`'s grant back on.
    pub async fn grant(
        &self,
        signer: &Signer,
        recipient: &Address,
        index: u64,
    ) -> Result<PendingTx, Error> {
        self.submit(
            signer,
            LedgerCall::GrantAccess {
                recipient: recipient.clone(),
                index,
            },
        )
        .await
    }

    async fn submit(&self, signer: &Signer, call: LedgerCall) -> Result<PendingTx, Error> {
        let method = call.method();
        let tx = self.transport.submit(signer, call, self.options()).await?;
        debug!(method = method, tx = %tx.hash, "transaction submitted");
        Ok(tx)
    }

    /// Await confirmation of a pending transaction.
    ///
    /// A submitted-but-unconfirmed transaction has NOT durably changed state;
    /// callers must not refresh listings until this returns `Ok`. Elapsing
    /// the configured bound yields [`Error::Timeout`].
    pub async fn confirm(&self, tx: &PendingTx) -> Result<(), Error> {
        match tokio::time::timeout(self.confirmation_timeout, self.transport.confirm(tx)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tx = %tx.hash, "confirmation timed out");
                Err(Error::Timeout)
            }
        }
    }

    /// Submit and confirm in one step, for callers that do not need to
    /// observe the pending phase.
    pub async fn execute(&self, signer: &Signer, call: LedgerCall) -> Result<PendingTx, Error> {
        let tx = self.submit(signer, call).await?;
        self.confirm(&tx).await?;
        Ok(tx)
    }

    // ========================================================================
    // Reads (degrade, don't crash)
    // ========================================================================

    /// All records owned by `user`. Malformed responses degrade to empty.
    pub async fn list_own_records(&self, user: &Address) -> Vec<FileRecord> {
        let value = match self
            .transport
            .query(LedgerQuery::UserFiles { user: user.clone() })
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, user = %user.short(), "failed to load own records");
                return Vec::new();
            }
        };
        match decode::decode_file_records(&value) {
            Some(records) => records,
            None => {
                warn!(user = %user.short(), "malformed own-records response, returning empty");
                Vec::new()
            }
        }
    }

    /// All share projections targeting `user`, including revoked ones.
    /// Malformed responses degrade to empty.
    pub async fn list_shared_records(&self, user: &Address) -> Vec<SharedFileView> {
        let value = match self
            .transport
            .query(LedgerQuery::SharedFiles { user: user.clone() })
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, user = %user.short(), "failed to load shared records");
                return Vec::new();
            }
        };
        match decode::decode_shared_views(&value) {
            Some(views) => views,
            None => {
                warn!(user = %user.short(), "malformed shared-records response, returning empty");
                Vec::new()
            }
        }
    }

    /// Recipients of the caller's file at `index`. Malformed responses
    /// degrade to empty.
    pub async fn list_recipients(&self, owner: &Address, index: u64) -> Vec<Recipient> {
        let value = match self
            .transport
            .query(LedgerQuery::SharedFileRecipients {
                owner: owner.clone(),
                index,
            })
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, index = index, "failed to load recipients");
                return Vec::new();
            }
        };
        match decode::decode_recipients(&value) {
            Some(recipients) => recipients,
            None => {
                warn!(index = index, "malformed recipients response, returning empty");
                Vec::new()
            }
        }
    }
}
