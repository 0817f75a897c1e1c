//! In-memory wallet double
//!
//! Hands out a fixed identity. Handshakes can be held open (to exercise the
//! one-connect-in-flight rule) or made to fail with a chosen error.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::client::{Error, Signer, WalletProvider, WalletSession};
use crate::identity::Address;

/// In-memory [`WalletProvider`] for tests
pub struct MockWallet {
    address: Address,
    hold: AtomicBool,
    notify: Notify,
    fail_next: Mutex<Option<Error>>,
    connect_count: AtomicU64,
}

impl MockWallet {
    pub fn new(address: Address) -> Self {
        MockWallet {
            address,
            hold: AtomicBool::new(false),
            notify: Notify::new(),
            fail_next: Mutex::new(None),
            connect_count: AtomicU64::new(0),
        }
    }

    /// Convenience constructor for tests.
    ///
    /// # Panics
    /// Panics if `address` is not a valid address string.
    pub fn with_address(address: &str) -> Self {
        MockWallet::new(Address::parse(address).expect("valid test address"))
    }

    /// Hold handshakes open until [`release_connects`](Self::release_connects).
    pub fn hold_connects(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Let held handshakes complete.
    pub fn release_connects(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Make the next handshake fail with `error`.
    pub fn fail_next_connect(&self, error: Error) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    /// Number of handshakes started.
    pub fn connect_count(&self) -> u64 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn connect(&self) -> Result<WalletSession, Error> {
        let n = self.connect_count.fetch_add(1, Ordering::SeqCst) + 1;
        loop {
            let notified = self.notify.notified();
            if !self.hold.load(Ordering::SeqCst) {
                break;
            }
            notified.await;
        }
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }
        Ok(WalletSession {
            address: self.address.clone(),
            signer: Signer::new(self.address.clone(), format!("mock-signer-{}", n)),
        })
    }
}
