//! File registry view
//!
//! The reconciled, caller-facing view of "my files" and "files shared with
//! me". Every refresh wholesale-replaces the cached listing; stale and fresh
//! data are never merged, so a listing is always a single ledger snapshot.
//!
//! Shared listings apply the access filter before exposure: a revoked grant
//! (`has_access == false`) is upstream audit history, never an accessible
//! file.

use tokio::sync::RwLock;
use tracing::debug;

use crate::client::{FileRecord, SharedFileView};
use crate::identity::Address;
use crate::ledger::LedgerClient;

/// Cached own/shared listings for the connected identity
pub struct RegistryView {
    own: RwLock<Vec<FileRecord>>,
    shared: RwLock<Vec<SharedFileView>>,
}

impl RegistryView {
    pub(crate) fn new() -> Self {
        RegistryView {
            own: RwLock::new(Vec::new()),
            shared: RwLock::new(Vec::new()),
        }
    }

    /// Re-fetch the own-files listing and replace the cache.
    pub async fn refresh_own(&self, ledger: &LedgerClient, user: &Address) -> Vec<FileRecord> {
        let records = ledger.list_own_records(user).await;
        debug!(user = %user.short(), count = records.len(), "own listing refreshed");
        *self.own.write().await = records.clone();
        records
    }

    /// Re-fetch the shared-files listing and replace the cache.
    ///
    /// Returns only accessible entries; the cache keeps the full snapshot
    /// (revoked grants included) as the ledger reported it.
    pub async fn refresh_shared(
        &self,
        ledger: &LedgerClient,
        user: &Address,
    ) -> Vec<SharedFileView> {
        let views = ledger.list_shared_records(user).await;
        debug!(user = %user.short(), count = views.len(), "shared listing refreshed");
        *self.shared.write().await = views;
        self.shared_files().await
    }

    /// The cached own-files listing.
    pub async fn own_files(&self) -> Vec<FileRecord> {
        self.own.read().await.clone()
    }

    /// The cached shared-files listing, accessible entries only.
    pub async fn shared_files(&self) -> Vec<SharedFileView> {
        self.shared
            .read()
            .await
            .iter()
            .filter(|view| view.has_access)
            .cloned()
            .collect()
    }

    /// Drop both cached listings (session teardown).
    pub(crate) async fn clear(&self) {
        self.own.write().await.clear();
        self.shared.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::client::Signer;
    use crate::ledger::{LedgerCall, RecordParams};
    use crate::testing::MockLedger;

    const ALICE: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const BOB: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

    fn ledger_client(ledger: &Arc<MockLedger>) -> LedgerClient {
        LedgerClient::new(ledger.clone(), 5_000_000, Duration::from_secs(5))
    }

    fn params(name: &str) -> RecordParams {
        RecordParams {
            content_id: format!("Qm{}", name),
            file_name: name.to_string(),
            description: String::new(),
            file_type: "text/plain".to_string(),
            file_size: 1,
            is_public: true,
        }
    }

    #[tokio::test]
    async fn test_refresh_own_replaces_cache_wholesale() {
        let mock = Arc::new(MockLedger::new());
        let ledger = ledger_client(&mock);
        let alice = Address::parse(ALICE).unwrap();
        let signer = Signer::new(alice.clone(), "mock");
        let view = RegistryView::new();

        ledger
            .execute(&signer, LedgerCall::UploadFile(params("a.txt")))
            .await
            .unwrap();
        view.refresh_own(&ledger, &alice).await;
        assert_eq!(view.own_files().await.len(), 1);

        ledger
            .execute(&signer, LedgerCall::DeleteFile { index: 0 })
            .await
            .unwrap();
        view.refresh_own(&ledger, &alice).await;
        assert!(view.own_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_shared_files_excludes_revoked_grants() {
        let mock = Arc::new(MockLedger::new());
        let ledger = ledger_client(&mock);
        let alice = Address::parse(ALICE).unwrap();
        let bob = Address::parse(BOB).unwrap();
        let signer = Signer::new(alice.clone(), "mock");
        let view = RegistryView::new();

        ledger
            .execute(&signer, LedgerCall::UploadFile(params("a.txt")))
            .await
            .unwrap();
        ledger
            .execute(&signer, LedgerCall::UploadFile(params("b.txt")))
            .await
            .unwrap();
        ledger.execute(&signer, LedgerCall::ShareFile { recipient: bob.clone(), index: 0 }).await.unwrap();
        ledger.execute(&signer, LedgerCall::ShareFile { recipient: bob.clone(), index: 1 }).await.unwrap();
        ledger
            .execute(&signer, LedgerCall::RevokeAccess { recipient: bob.clone(), index: 0 })
            .await
            .unwrap();

        let visible = view.refresh_shared(&ledger, &bob).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].record.file_name, "b.txt");
        assert_eq!(view.shared_files().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_both_caches() {
        let mock = Arc::new(MockLedger::new());
        let ledger = ledger_client(&mock);
        let alice = Address::parse(ALICE).unwrap();
        let signer = Signer::new(alice.clone(), "mock");
        let view = RegistryView::new();

        ledger
            .execute(&signer, LedgerCall::UploadFile(params("a.txt")))
            .await
            .unwrap();
        view.refresh_own(&ledger, &alice).await;
        assert!(!view.own_files().await.is_empty());

        view.clear().await;
        assert!(view.own_files().await.is_empty());
        assert!(view.shared_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_read_refresh_yields_empty_listing() {
        let mock = Arc::new(MockLedger::new());
        let ledger = ledger_client(&mock);
        let alice = Address::parse(ALICE).unwrap();
        let view = RegistryView::new();

        mock.set_malformed_reads(true);
        let records = view.refresh_own(&ledger, &alice).await;
        assert!(records.is_empty());
        assert!(view.refresh_shared(&ledger, &alice).await.is_empty());
    }
}
