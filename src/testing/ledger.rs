//! In-memory ledger double
//!
//! Emulates the file-registry contract's observable behavior: records keyed
//! by `(owner, index)`, tombstoning deletes, per-recipient grants flipped by
//! share/revoke/grant, and the read shapes of `getUserFiles`,
//! `getSharedFiles` and `getSharedFileRecipients`.
//!
//! Mutations are two-phase like the real thing: `submit` stages an effect,
//! `confirm` applies it. Confirmations can be held open so tests can observe
//! the pending window, and submits/confirms/reads can be made to fail or
//! return malformed shapes on demand.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::client::{Error, Signer};
use crate::identity::Address;
use crate::ledger::{CallOptions, LedgerCall, LedgerQuery, LedgerTransport, PendingTx, RecordParams};

struct Grant {
    recipient: Address,
    has_access: bool,
    shared_at: i64,
}

struct StoredFile {
    params: RecordParams,
    owner: Address,
    created_at: i64,
    deleted: bool,
    grants: Vec<Grant>,
}

#[derive(Default)]
struct LedgerState {
    files: HashMap<Address, Vec<StoredFile>>,
}

struct StagedEffect {
    actor: Address,
    call: LedgerCall,
}

/// In-memory [`LedgerTransport`] for tests
pub struct MockLedger {
    state: Mutex<LedgerState>,
    staged: Mutex<HashMap<String, StagedEffect>>,
    hold: AtomicBool,
    released: Mutex<Vec<String>>,
    notify: Notify,
    reject_next_submit: Mutex<Option<Error>>,
    fail_next_confirm: Mutex<Option<Error>>,
    malformed_reads: AtomicBool,
    submit_count: AtomicU64,
    confirm_count: AtomicU64,
    query_count: AtomicU64,
    last_gas_limit: AtomicU64,
    tx_counter: AtomicU64,
    clock: AtomicI64,
}

impl MockLedger {
    pub fn new() -> Self {
        MockLedger {
            state: Mutex::new(LedgerState::default()),
            staged: Mutex::new(HashMap::new()),
            hold: AtomicBool::new(false),
            released: Mutex::new(Vec::new()),
            notify: Notify::new(),
            reject_next_submit: Mutex::new(None),
            fail_next_confirm: Mutex::new(None),
            malformed_reads: AtomicBool::new(false),
            submit_count: AtomicU64::new(0),
            confirm_count: AtomicU64::new(0),
            query_count: AtomicU64::new(0),
            last_gas_limit: AtomicU64::new(0),
            tx_counter: AtomicU64::new(0),
            clock: AtomicI64::new(1_700_000_000),
        }
    }

    // ========================================================================
    // Test controls
    // ========================================================================

    /// Hold all confirmations open until released.
    pub fn hold_confirmations(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Release one held transaction by hash.
    pub fn release_confirmation(&self, tx_hash: &str) {
        self.released.lock().unwrap().push(tx_hash.to_string());
        self.notify.notify_waiters();
    }

    /// Release every held confirmation and stop holding new ones.
    pub fn release_all(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Make the next submit fail with `error`.
    pub fn reject_next_submit(&self, error: Error) {
        *self.reject_next_submit.lock().unwrap() = Some(error);
    }

    /// Make the next confirmation fail with `error` (the staged effect is
    /// discarded, as a dropped transaction would be).
    pub fn fail_next_confirm(&self, error: Error) {
        *self.fail_next_confirm.lock().unwrap() = Some(error);
    }

    /// Make every read return a malformed (non-array) shape.
    pub fn set_malformed_reads(&self, malformed: bool) {
        self.malformed_reads.store(malformed, Ordering::SeqCst);
    }

    pub fn submit_count(&self) -> u64 {
        self.submit_count.load(Ordering::SeqCst)
    }

    pub fn confirm_count(&self) -> u64 {
        self.confirm_count.load(Ordering::SeqCst)
    }

    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Gas limit attached to the most recent submit.
    pub fn last_gas_limit(&self) -> u64 {
        self.last_gas_limit.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Contract emulation
    // ========================================================================

    fn next_timestamp(&self) -> i64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }

    fn apply(&self, effect: StagedEffect) -> Result<(), Error> {
        let now = self.next_timestamp();
        let mut state = self.state.lock().unwrap();
        match effect.call {
            LedgerCall::UploadFile(params) => {
                state.files.entry(effect.actor.clone()).or_default().push(StoredFile {
                    params,
                    owner: effect.actor,
                    created_at: now,
                    deleted: false,
                    grants: Vec::new(),
                });
                Ok(())
            }
            LedgerCall::DeleteFile { index } => {
                let file = live_file_mut(&mut state, &effect.actor, index)?;
                file.deleted = true;
                Ok(())
            }
            LedgerCall::ToggleVisibility { index } => {
                let file = live_file_mut(&mut state, &effect.actor, index)?;
                file.params.is_public = !file.params.is_public;
                Ok(())
            }
            LedgerCall::ShareFile { recipient, index } => {
                let file = live_file_mut(&mut state, &effect.actor, index)?;
                match file.grants.iter_mut().find(|g| g.recipient == recipient) {
                    Some(grant) => {
                        grant.has_access = true;
                        grant.shared_at = now;
                    }
                    None => file.grants.push(Grant {
                        recipient,
                        has_access: true,
                        shared_at: now,
                    }),
                }
                Ok(())
            }
            LedgerCall::RevokeAccess { recipient, index } => {
                set_grant(&mut state, &effect.actor, &recipient, index, false)
            }
            LedgerCall::GrantAccess { recipient, index } => {
                set_grant(&mut state, &effect.actor, &recipient, index, true)
            }
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        MockLedger::new()
    }
}

fn live_file_mut<'a>(
    state: &'a mut LedgerState,
    owner: &Address,
    index: u64,
) -> Result<&'a mut StoredFile, Error> {
    state
        .files
        .get_mut(owner)
        .and_then(|files| files.get_mut(index as usize))
        .filter(|file| !file.deleted)
        .ok_or_else(|| Error::RemoteRejected(format!("execution reverted: no file at index {}", index)))
}

fn set_grant(
    state: &mut LedgerState,
    owner: &Address,
    recipient: &Address,
    index: u64,
    has_access: bool,
) -> Result<(), Error> {
    let file = live_file_mut(state, owner, index)?;
    let grant = file
        .grants
        .iter_mut()
        .find(|g| &g.recipient == recipient)
        .ok_or_else(|| {
            Error::RemoteRejected(format!(
                "execution reverted: no grant for {}",
                recipient.short()
            ))
        })?;
    grant.has_access = has_access;
    Ok(())
}

fn record_json(file: &StoredFile) -> Value {
    json!({
        "ipfsHash": file.params.content_id,
        "fileName": file.params.file_name,
        "timestamp": file.created_at,
        "owner": file.owner.as_str(),
        "isPublic": file.params.is_public,
        "description": file.params.description,
        "fileType": file.params.file_type,
        "fileSize": file.params.file_size,
    })
}

#[async_trait]
impl LedgerTransport for MockLedger {
    async fn submit(
        &self,
        signer: &Signer,
        call: LedgerCall,
        options: CallOptions,
    ) -> Result<PendingTx, Error> {
        self.submit_count.fetch_add(1, Ordering::SeqCst);
        self.last_gas_limit.store(options.gas_limit, Ordering::SeqCst);
        if let Some(error) = self.reject_next_submit.lock().unwrap().take() {
            return Err(error);
        }
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = format!("0xtx{:08x}", n);
        self.staged.lock().unwrap().insert(
            hash.clone(),
            StagedEffect {
                actor: signer.address().clone(),
                call,
            },
        );
        Ok(PendingTx { hash })
    }

    async fn confirm(&self, tx: &PendingTx) -> Result<(), Error> {
        self.confirm_count.fetch_add(1, Ordering::SeqCst);
        loop {
            let notified = self.notify.notified();
            let held = self.hold.load(Ordering::SeqCst)
                && !self.released.lock().unwrap().iter().any(|h| h == &tx.hash);
            if !held {
                break;
            }
            notified.await;
        }
        if let Some(error) = self.fail_next_confirm.lock().unwrap().take() {
            self.staged.lock().unwrap().remove(&tx.hash);
            return Err(error);
        }
        let effect = self
            .staged
            .lock()
            .unwrap()
            .remove(&tx.hash)
            .ok_or_else(|| Error::Network(format!("unknown transaction {}", tx.hash)))?;
        self.apply(effect)
    }

    async fn query(&self, query: LedgerQuery) -> Result<Value, Error> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if self.malformed_reads.load(Ordering::SeqCst) {
            return Ok(json!({ "error": "unexpected shape" }));
        }
        let state = self.state.lock().unwrap();
        let value = match query {
            LedgerQuery::UserFiles { user } => {
                let rows: Vec<Value> = state
                    .files
                    .get(&user)
                    .map(|files| {
                        files
                            .iter()
                            .filter(|f| !f.deleted)
                            .map(record_json)
                            .collect()
                    })
                    .unwrap_or_default();
                Value::Array(rows)
            }
            LedgerQuery::SharedFiles { user } => {
                let mut files = Vec::new();
                let mut shared_by = Vec::new();
                let mut shared_at = Vec::new();
                let mut has_access = Vec::new();
                for owner_files in state.files.values() {
                    for file in owner_files.iter().filter(|f| !f.deleted) {
                        for grant in file.grants.iter().filter(|g| g.recipient == user) {
                            files.push(record_json(file));
                            shared_by.push(json!(file.owner.as_str()));
                            shared_at.push(json!(grant.shared_at));
                            has_access.push(json!(grant.has_access));
                        }
                    }
                }
                json!({
                    "files": files,
                    "sharedBy": shared_by,
                    "sharedAt": shared_at,
                    "hasAccess": has_access,
                })
            }
            LedgerQuery::SharedFileRecipients { owner, index } => {
                let grants = state
                    .files
                    .get(&owner)
                    .and_then(|files| files.get(index as usize))
                    .filter(|file| !file.deleted)
                    .map(|file| file.grants.as_slice())
                    .unwrap_or_default();
                json!({
                    "recipients": grants.iter().map(|g| g.recipient.as_str()).collect::<Vec<_>>(),
                    "accessStatus": grants.iter().map(|g| g.has_access).collect::<Vec<_>>(),
                })
            }
        };
        Ok(value)
    }
}
