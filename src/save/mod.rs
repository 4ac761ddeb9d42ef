//! Persistence for the command-line tool
//!
//! Session state files and the local ledger that stands in for the wallet.

pub mod session;
pub mod ledger;

pub use session::{SessionStore, SessionStoreError};
pub use ledger::{JsonLedger, LedgerEntry};
