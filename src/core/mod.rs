//! Core admission abstractions: domain model, decision logic, and seams.

pub mod admission;
pub mod audit;
pub mod error;
pub mod gate;
pub mod model;
pub mod ports;

pub use admission::{AdmissionController, RetryPolicy};
pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, PostgresAuditSink,
};
pub use error::{AdmissionError, AppResult, LedgerError};
pub use gate::{SlotGates, SlotKey};
pub use model::{
    Booking, BookingId, BookingRequest, BookingStatus, ClassId, ClassSlot, MemberId,
};
pub use ports::{
    BookingLedger, BookingNote, BookingNotifier, BookingOutcome, CancelAuthorizer, ClassCatalog,
    OwnerOnly, Spawn,
};
