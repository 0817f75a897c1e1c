//! Testing utilities
//!
//! In-process doubles for the two external collaborators, so client behavior
//! can be exercised without a chain or a wallet.
//!
//! # Example
//!
//! ```ignore
//! let ledger = Arc::new(MockLedger::new());
//! let wallet = Arc::new(MockWallet::with_address("0x1234..."));
//! let client = Client::new(ClientConfig::for_testing(), wallet, ledger.clone())?;
//!
//! // Observe the pending-confirmation window
//! ledger.hold_confirmations();
//! ```

mod ledger;
mod node_server;
mod wallet;

pub use ledger::MockLedger;
pub use node_server::StubNodeServer;
pub use wallet::MockWallet;
