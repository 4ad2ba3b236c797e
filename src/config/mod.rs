//! Configuration models for the admission service.

pub mod admission;

pub use admission::{AdmissionConfig, AuditBackendConfig, LedgerBackendConfig, ServiceConfig};
