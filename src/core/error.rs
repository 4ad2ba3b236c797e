//! Error types for admission and ledger operations.

use thiserror::Error;

/// Typed outcome reasons surfaced across the admission boundary.
///
/// Every rejection is a decision, not a fault: callers map each variant to a
/// user-facing message. Nothing here propagates as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The class does not exist or has been withdrawn from the schedule.
    #[error("class not found")]
    ClassNotFound,
    /// The requested date is not one of the class's scheduled days.
    #[error("class does not run on the requested date")]
    InvalidDate,
    /// The member already holds an active booking for this class and date.
    ///
    /// Idempotent reject: retrying yields the same answer, never a fault.
    #[error("member already holds an active booking")]
    DuplicateBooking,
    /// All capacity slots for the class and date are taken.
    #[error("class capacity exceeded")]
    CapacityExceeded,
    /// Cancellation/attendance target does not exist or is not active.
    #[error("booking not found or not active")]
    NotFound,
    /// The actor is not allowed to cancel this booking.
    #[error("actor not permitted to cancel this booking")]
    Forbidden,
    /// Storage kept failing transiently after bounded retries; the caller
    /// may retry the whole request.
    #[error("transient storage failure: {0}")]
    TransientFailure(String),
}

/// Errors produced by ledger backends.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Insert collided with an existing active booking for the same
    /// member, class, and date (uniqueness constraint).
    #[error("active booking already exists for member/class/date")]
    DuplicateActive,
    /// Transient backend fault (deadlock, timeout, serialization conflict);
    /// eligible for bounded retry inside the critical section.
    #[error("transient ledger failure: {0}")]
    Transient(String),
    /// Non-transient backend failure with context.
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
