//! Main Client implementation
//!
//! The Client owns the session and wires the components together:
//! uploads go store-then-ledger, every confirmed mutation is followed by a
//! full listing refresh, and sharing actions route through the
//! [`SharingController`] state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::identity::Address;
use crate::ledger::{LedgerClient, LedgerTransport, RecordParams};
use crate::registry::RegistryView;
use crate::sharing::{ShareAction, SharingController};
use crate::store::{ContentStore, ProgressFn};

use super::config::ClientConfig;
use super::error::Error;
use super::types::{FileRecord, Recipient, Session, SharedFileView, UploadOptions, WalletProvider};

/// The DecentraShare client
///
/// All state is in memory: the session and the two listing caches. The
/// ledger and the content store hold everything durable.
pub struct Client {
    wallet: Arc<dyn WalletProvider>,
    ledger: LedgerClient,
    store: ContentStore,
    registry: RegistryView,
    sharing: SharingController,
    /// Active session; `None` until a wallet handshake succeeds
    session: RwLock<Option<Session>>,
    /// Guard serializing wallet handshakes
    connecting: AtomicBool,
}

impl Client {
    /// Build a client from config and the two external collaborators.
    ///
    /// Fails with [`Error::NotConfigured`] if the selected content store
    /// backend is missing credentials; this is checked here, eagerly, never
    /// at upload time.
    pub fn new(
        config: ClientConfig,
        wallet: Arc<dyn WalletProvider>,
        transport: Arc<dyn LedgerTransport>,
    ) -> Result<Self, Error> {
        let store = ContentStore::from_config(&config.store)?;
        let ledger = LedgerClient::new(transport, config.gas_limit, config.confirmation_timeout);
        Ok(Client {
            wallet,
            ledger,
            store,
            registry: RegistryView::new(),
            sharing: SharingController::new(),
            session: RwLock::new(None),
            connecting: AtomicBool::new(false),
        })
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Run the wallet handshake and install the session.
    ///
    /// Returns `Ok(None)` without doing anything if a handshake is already
    /// in flight; a second prompt would confuse the user's wallet, so
    /// concurrent requests are dropped rather than queued. Connecting over an
    /// existing session tears the old one down first, caches included.
    pub async fn connect(&self) -> Result<Option<Address>, Error> {
        if self.connecting.swap(true, Ordering::SeqCst) {
            debug!("wallet connect already in flight, ignoring");
            return Ok(None);
        }
        let result = self.connect_inner().await;
        self.connecting.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    async fn connect_inner(&self) -> Result<Address, Error> {
        let handshake = self.wallet.connect().await?;
        let mut session = self.session.write().await;
        if session.is_some() {
            // No cross-identity leakage: drop the old identity's listings
            self.registry.clear().await;
        }
        *session = Some(Session {
            address: handshake.address.clone(),
            signer: handshake.signer,
        });
        info!(address = %handshake.address.short(), "wallet connected");
        Ok(handshake.address)
    }

    /// Clear the session and both listing caches.
    pub async fn disconnect(&self) {
        *self.session.write().await = None;
        self.registry.clear().await;
        info!("wallet disconnected");
    }

    /// The connected identity, if any.
    pub async fn address(&self) -> Option<Address> {
        self.session.read().await.as_ref().map(|s| s.address.clone())
    }

    pub async fn is_connected(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn session(&self) -> Result<Session, Error> {
        self.session.read().await.clone().ok_or(Error::NotConnected)
    }

    // ========================================================================
    // Upload pipeline
    // ========================================================================

    /// Upload a blob to the content store, then record it on the ledger, then
    /// refresh the own-files listing. Returns the content identifier.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        file_type: &str,
        options: UploadOptions,
        progress: Option<ProgressFn>,
    ) -> Result<String, Error> {
        let session = self.session().await?;
        if file_name.trim().is_empty() {
            return Err(Error::InvalidArgument("file name must not be empty".to_string()));
        }

        let file_size = bytes.len() as u64;
        let content_id = self.store.upload(bytes, file_name, file_type, progress).await?;

        let tx = self
            .ledger
            .submit_record(
                &session.signer,
                RecordParams {
                    content_id: content_id.clone(),
                    file_name: file_name.to_string(),
                    description: options.description,
                    file_type: file_type.to_string(),
                    file_size,
                    is_public: options.is_public,
                },
            )
            .await?;
        self.ledger.confirm(&tx).await?;

        info!(
            content_id = %content_id,
            file = %file_name,
            size = file_size,
            tx = %tx.hash,
            "file recorded on ledger"
        );
        self.registry.refresh_own(&self.ledger, &session.address).await;
        Ok(content_id)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Re-fetch and replace the own-files listing.
    pub async fn refresh_own_files(&self) -> Result<Vec<FileRecord>, Error> {
        let session = self.session().await?;
        Ok(self.registry.refresh_own(&self.ledger, &session.address).await)
    }

    /// Re-fetch and replace the shared-files listing (accessible entries).
    pub async fn refresh_shared_files(&self) -> Result<Vec<SharedFileView>, Error> {
        let session = self.session().await?;
        Ok(self.registry.refresh_shared(&self.ledger, &session.address).await)
    }

    /// Cached own-files listing.
    pub async fn my_files(&self) -> Vec<FileRecord> {
        self.registry.own_files().await
    }

    /// Cached shared-files listing, accessible entries only.
    pub async fn shared_with_me(&self) -> Vec<SharedFileView> {
        self.registry.shared_files().await
    }

    /// Recipients of the connected identity's file at `index`.
    pub async fn list_recipients(&self, index: u64) -> Result<Vec<Recipient>, Error> {
        let session = self.session().await?;
        Ok(self.ledger.list_recipients(&session.address, index).await)
    }

    // ========================================================================
    // Record mutations
    // ========================================================================

    /// Tombstone a record, then refresh the own-files listing.
    pub async fn delete_file(&self, index: u64) -> Result<(), Error> {
        let session = self.session().await?;
        let tx = self.ledger.remove_record(&session.signer, index).await?;
        self.ledger.confirm(&tx).await?;
        info!(index = index, tx = %tx.hash, "file deleted");
        self.registry.refresh_own(&self.ledger, &session.address).await;
        Ok(())
    }

    /// Flip a record's visibility, then refresh the own-files listing.
    pub async fn toggle_visibility(&self, index: u64) -> Result<(), Error> {
        let session = self.session().await?;
        let tx = self.ledger.set_visibility(&session.signer, index).await?;
        self.ledger.confirm(&tx).await?;
        info!(index = index, tx = %tx.hash, "file visibility toggled");
        self.registry.refresh_own(&self.ledger, &session.address).await;
        Ok(())
    }

    // ========================================================================
    // Sharing
    // ========================================================================

    /// Share the file at `index` with `recipient`.
    ///
    /// `recipient` is validated locally before anything is submitted; see
    /// [`SharingController`] for the settlement and refresh ordering.
    pub async fn share_file(&self, recipient: &str, index: u64) -> Result<Vec<Recipient>, Error> {
        self.run_share_action(ShareAction::Share, recipient, index).await
    }

    /// Revoke `recipient`'s access to the file at `index`.
    pub async fn revoke_access(&self, recipient: &str, index: u64) -> Result<Vec<Recipient>, Error> {
        self.run_share_action(ShareAction::Revoke, recipient, index).await
    }

    /// Re-grant `recipient`'s access to the file at `index`.
    pub async fn grant_access(&self, recipient: &str, index: u64) -> Result<Vec<Recipient>, Error> {
        self.run_share_action(ShareAction::Grant, recipient, index).await
    }

    async fn run_share_action(
        &self,
        action: ShareAction,
        recipient: &str,
        index: u64,
    ) -> Result<Vec<Recipient>, Error> {
        let recipient = Address::parse(recipient)?;
        let session = self.session().await?;
        self.sharing
            .run(&self.ledger, &self.registry, &session.signer, action, &recipient, index)
            .await
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Resolve a content identifier to a gateway retrieval URL.
    pub fn resolve(&self, content_id: &str) -> String {
        self.store.resolve(content_id)
    }

    /// The content store client.
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// The sharing state machine, for per-target state queries.
    pub fn sharing(&self) -> &SharingController {
        &self.sharing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{MockLedger, MockWallet};

    const ALICE: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn new_client(
        wallet: &Arc<MockWallet>,
        ledger: &Arc<MockLedger>,
    ) -> Client {
        Client::new(ClientConfig::for_testing(), wallet.clone(), ledger.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_connect_disconnect_lifecycle() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = new_client(&wallet, &ledger);

        assert!(!client.is_connected().await);
        let address = client.connect().await.unwrap().unwrap();
        assert_eq!(address.as_str(), ALICE);
        assert!(client.is_connected().await);
        assert_eq!(client.address().await.unwrap(), address);

        client.disconnect().await;
        assert!(!client.is_connected().await);
        assert!(client.address().await.is_none());
    }

    #[tokio::test]
    async fn test_second_connect_while_in_flight_is_dropped() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = Arc::new(new_client(&wallet, &ledger));
        wallet.hold_connects();

        let first = {
            let client = client.clone();
            tokio::spawn(async move { client.connect().await })
        };
        // Wait until the held handshake has actually started
        tokio::time::timeout(Duration::from_secs(5), async {
            while wallet.connect_count() < 1 {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .unwrap();

        // The second request is dropped, not queued: no extra prompt
        assert_eq!(client.connect().await.unwrap(), None);
        assert_eq!(wallet.connect_count(), 1);

        wallet.release_connects();
        let address = first.await.unwrap().unwrap().unwrap();
        assert_eq!(address.as_str(), ALICE);
    }

    #[tokio::test]
    async fn test_failed_connect_releases_the_guard() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = new_client(&wallet, &ledger);

        wallet.fail_next_connect(Error::WalletBusy);
        assert!(matches!(client.connect().await.unwrap_err(), Error::WalletBusy));

        // The guard must not stay stuck after a failure
        assert!(client.connect().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = new_client(&wallet, &ledger);

        assert!(matches!(client.delete_file(0).await.unwrap_err(), Error::NotConnected));
        assert!(matches!(
            client.toggle_visibility(0).await.unwrap_err(),
            Error::NotConnected
        ));
        assert!(matches!(
            client
                .share_file("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd", 0)
                .await
                .unwrap_err(),
            Error::NotConnected
        ));
        // Local precondition failures never reach the transport
        assert_eq!(ledger.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_recipient_makes_no_remote_call() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = new_client(&wallet, &ledger);
        client.connect().await.unwrap();

        let err = client.share_file("not-an-address", 0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(ledger.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_reconnect_clears_cached_listings() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = new_client(&wallet, &ledger);
        client.connect().await.unwrap();

        // Populate the cache through the ledger directly, then refresh
        let session = client.session().await.unwrap();
        let tx = client
            .ledger
            .submit_record(
                &session.signer,
                RecordParams {
                    content_id: "QmFoo".to_string(),
                    file_name: "a.txt".to_string(),
                    description: String::new(),
                    file_type: "text/plain".to_string(),
                    file_size: 1,
                    is_public: true,
                },
            )
            .await
            .unwrap();
        client.ledger.confirm(&tx).await.unwrap();
        client.refresh_own_files().await.unwrap();
        assert_eq!(client.my_files().await.len(), 1);

        // A fresh handshake replaces the session and drops the caches
        client.connect().await.unwrap();
        assert!(client.my_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_records_file_and_refreshes_listing() {
        let server = crate::testing::StubNodeServer::start("QmUploaded")
            .await
            .unwrap();
        let mut config = ClientConfig::for_testing();
        config.store.node_api_url = Some(server.api_url().to_string());

        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = Client::new(config, wallet.clone(), ledger.clone()).unwrap();
        client.connect().await.unwrap();

        let payload = vec![0u8; 10 * 1024 * 1024];
        let content_id = client
            .upload_file(payload, "a.png", "image/png", UploadOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(content_id, "QmUploaded");
        assert_eq!(server.requests(), 1);

        let files = client.my_files().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content_id, "QmUploaded");
        assert_eq!(files[0].file_name, "a.png");
        assert_eq!(files[0].file_type, "image/png");
        assert_eq!(files[0].file_size, 10 * 1024 * 1024);
        assert!(files[0].is_public);
        assert_eq!(files[0].description, "");
        assert_eq!(files[0].owner.as_str(), ALICE);
    }

    #[tokio::test]
    async fn test_oversize_upload_touches_neither_store_nor_ledger() {
        let mut config = ClientConfig::for_testing();
        config.store.max_upload_bytes = 1024;

        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = Client::new(config, wallet.clone(), ledger.clone()).unwrap();
        client.connect().await.unwrap();

        let err = client
            .upload_file(vec![0u8; 1025], "a.bin", "application/octet-stream", UploadOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SizeExceeded { size: 1025, limit: 1024 }));
        assert_eq!(client.store().network_attempts(), 0);
        assert_eq!(ledger.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_visibility_flips_only_the_flag() {
        let server = crate::testing::StubNodeServer::start("QmToggle").await.unwrap();
        let mut config = ClientConfig::for_testing();
        config.store.node_api_url = Some(server.api_url().to_string());

        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = Client::new(config, wallet.clone(), ledger.clone()).unwrap();
        client.connect().await.unwrap();

        client
            .upload_file(vec![1u8; 16], "a.txt", "text/plain", UploadOptions::default(), None)
            .await
            .unwrap();
        let before = client.my_files().await;
        assert!(before[0].is_public);

        client.toggle_visibility(0).await.unwrap();
        let after = client.my_files().await;
        assert!(!after[0].is_public);
        assert_eq!(after[0].file_name, before[0].file_name);
        assert_eq!(after[0].content_id, before[0].content_id);
        assert_eq!(after[0].file_size, before[0].file_size);
    }

    #[tokio::test]
    async fn test_delete_removes_record_from_listing() {
        let server = crate::testing::StubNodeServer::start("QmDel").await.unwrap();
        let mut config = ClientConfig::for_testing();
        config.store.node_api_url = Some(server.api_url().to_string());

        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = Client::new(config, wallet.clone(), ledger.clone()).unwrap();
        client.connect().await.unwrap();

        client
            .upload_file(vec![1u8; 8], "a.txt", "text/plain", UploadOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(client.my_files().await.len(), 1);

        client.delete_file(0).await.unwrap();
        assert!(client.my_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_share_revoke_grant_round_trip() {
        const BOB: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

        let server = crate::testing::StubNodeServer::start("QmShare").await.unwrap();
        let mut config = ClientConfig::for_testing();
        config.store.node_api_url = Some(server.api_url().to_string());

        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = Client::new(config, wallet.clone(), ledger.clone()).unwrap();
        client.connect().await.unwrap();

        client
            .upload_file(vec![1u8; 8], "a.txt", "text/plain", UploadOptions::default(), None)
            .await
            .unwrap();

        let recipients = client.share_file(BOB, 0).await.unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].address.as_str(), BOB);
        assert!(recipients[0].has_access);

        let recipients = client.revoke_access(BOB, 0).await.unwrap();
        assert!(!recipients[0].has_access);

        let recipients = client.grant_access(BOB, 0).await.unwrap();
        assert!(recipients[0].has_access);

        assert_eq!(client.list_recipients(0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_delegates_to_store() {
        let wallet = Arc::new(MockWallet::with_address(ALICE));
        let ledger = Arc::new(MockLedger::new());
        let client = new_client(&wallet, &ledger);
        assert_eq!(
            client.resolve("QmFoo"),
            "https://gateway.pinata.cloud/ipfs/QmFoo"
        );
    }
}
