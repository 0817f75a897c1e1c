//! Sharing controller
//!
//! Orchestrates share/revoke/grant actions as a per-target state machine:
//!
//! ```text
//! Idle → Submitting → PendingConfirmation → Settled(Success | Failed)
//! ```
//!
//! A target is a `(file index, recipient)` pair. Listings and the recipient
//! list are refreshed only after `Settled(Success)`; a submitted-but-
//! unconfirmed transaction has not durably changed anything, so refreshing
//! earlier would show stale data as fresh. While a target is in flight,
//! further triggers for the same target are refused; actions on different
//! targets run independently.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::client::{Error, Recipient, Signer};
use crate::identity::Address;
use crate::ledger::LedgerClient;
use crate::registry::RegistryView;

/// The three grant-mutating actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    /// Create a grant (or re-enable one) for a new recipient
    Share,
    /// Flip an existing grant off
    Revoke,
    /// Flip an existing grant back on
    Grant,
}

/// Terminal result of a sharing action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Success,
    Failed,
}

/// Lifecycle of one sharing action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareState {
    /// No action in flight for the target
    Idle,
    /// Request handed to the remote, no transaction handle yet
    Submitting,
    /// Transaction handle obtained, awaiting confirmation
    PendingConfirmation,
    /// Action finished
    Settled(ShareOutcome),
}

impl ShareState {
    /// Whether a new action for the same target must be refused.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ShareState::Submitting | ShareState::PendingConfirmation)
    }
}

type Target = (u64, Address);

/// Per-target sharing state machine
pub struct SharingController {
    states: Mutex<HashMap<Target, ShareState>>,
}

impl SharingController {
    pub(crate) fn new() -> Self {
        SharingController {
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current state for a target; `Idle` if never touched.
    pub fn state(&self, index: u64, recipient: &Address) -> ShareState {
        self.states
            .lock()
            .unwrap()
            .get(&(index, recipient.clone()))
            .copied()
            .unwrap_or(ShareState::Idle)
    }

    /// Whether an action for this target is currently in flight.
    pub fn is_busy(&self, index: u64, recipient: &Address) -> bool {
        self.state(index, recipient).is_in_flight()
    }

    fn set_state(&self, target: &Target, state: ShareState) {
        self.states.lock().unwrap().insert(target.clone(), state);
    }

    /// Try to move a target from not-in-flight to `Submitting`.
    fn begin(&self, target: &Target) -> Result<(), Error> {
        let mut states = self.states.lock().unwrap();
        if states.get(target).is_some_and(|s| s.is_in_flight()) {
            return Err(Error::InvalidArgument(
                "a sharing action for this file and recipient is already in flight".to_string(),
            ));
        }
        states.insert(target.clone(), ShareState::Submitting);
        Ok(())
    }

    /// Run one sharing action to settlement.
    ///
    /// On `Settled(Success)` the own and shared listings are refreshed and
    /// the file's recipient list is re-fetched and returned. On any failure
    /// the caches are left untouched.
    pub async fn run(
        &self,
        ledger: &LedgerClient,
        registry: &RegistryView,
        signer: &Signer,
        action: ShareAction,
        recipient: &Address,
        index: u64,
    ) -> Result<Vec<Recipient>, Error> {
        let target = (index, recipient.clone());
        self.begin(&target)?;

        debug!(
            action = ?action,
            index = index,
            recipient = %recipient.short(),
            "sharing action submitting"
        );

        let submitted = match action {
            ShareAction::Share => ledger.share(signer, recipient, index).await,
            ShareAction::Revoke => ledger.revoke(signer, recipient, index).await,
            ShareAction::Grant => ledger.grant(signer, recipient, index).await,
        };
        let tx = match submitted {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %e, index = index, "sharing action rejected at submit");
                self.set_state(&target, ShareState::Settled(ShareOutcome::Failed));
                return Err(e);
            }
        };

        self.set_state(&target, ShareState::PendingConfirmation);

        if let Err(e) = ledger.confirm(&tx).await {
            warn!(error = %e, tx = %tx.hash, index = index, "sharing action failed to confirm");
            self.set_state(&target, ShareState::Settled(ShareOutcome::Failed));
            return Err(e);
        }

        self.set_state(&target, ShareState::Settled(ShareOutcome::Success));
        info!(
            action = ?action,
            index = index,
            recipient = %recipient.short(),
            tx = %tx.hash,
            "sharing action confirmed"
        );

        // Confirmed and durable; now the caches may be replaced.
        let owner = signer.address();
        registry.refresh_own(ledger, owner).await;
        registry.refresh_shared(ledger, owner).await;
        Ok(ledger.list_recipients(owner, index).await)
    }
}
