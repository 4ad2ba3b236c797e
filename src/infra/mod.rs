//! Infrastructure adapters for ledger, catalog, and notification backends.

pub mod catalog;
pub mod ledger;
pub mod notify;

pub use catalog::InMemoryCatalog;
pub use ledger::{InMemoryLedger, PostgresLedger};
pub use notify::{RecordingNotifier, TracingNotifier};
