//! Ledger client
//!
//! Wraps the fixed call set of the external file-registry contract. Pure
//! request/response: no local state beyond configuration.
//!
//! - `calls.rs`: Typed mutating calls and read queries
//! - `transport.rs`: The seam production RPC bridges and test doubles implement
//! - `client.rs`: Two-phase mutations, degrading reads
//! - `decode.rs`: Defensive response-shape validation

mod calls;
mod client;
mod decode;
mod transport;

pub use calls::{CallOptions, LedgerCall, LedgerQuery, RecordParams};
pub use client::LedgerClient;
pub use transport::{LedgerTransport, PendingTx};
