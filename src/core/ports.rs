//! Collaborator seams: ledger, catalog, notifier, authorizer, spawner.
//!
//! The admission controller is generic over these traits. Production wiring
//! supplies real backends; tests supply in-memory doubles that still enforce
//! the ledger's uniqueness constraint, so contention is exercised for real.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::core::error::LedgerError;
use crate::core::model::{Booking, BookingId, BookingStatus, ClassId, ClassSlot, MemberId};

/// Durable store of booking records.
///
/// The ledger is passive: it persists and constrains, the controller
/// decides. Implementations must enforce the at-most-one-active-booking
/// constraint per `(member, class, date)` on insert and report collisions as
/// [`LedgerError::DuplicateActive`], and must refuse illegal status
/// transitions (only `Booked -> Cancelled` and `Booked -> Attended` commit).
#[async_trait]
pub trait BookingLedger: Send + Sync + 'static {
    /// Persist a fresh `Booked` record.
    async fn insert(&self, booking: Booking) -> Result<(), LedgerError>;

    /// Look up the member's active booking for a class and date, if any.
    async fn find_active(
        &self,
        member_id: MemberId,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Option<Booking>, LedgerError>;

    /// Count active (`Booked`) records for a class and date.
    async fn count_active(&self, class_id: ClassId, date: NaiveDate) -> Result<u32, LedgerError>;

    /// Fetch a booking by ledger key.
    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>, LedgerError>;

    /// Transition a `Booked` record to a terminal status and return the
    /// updated record. Fails with [`LedgerError::Backend`] context if the
    /// record is missing or the transition is illegal.
    async fn transition(
        &self,
        booking_id: BookingId,
        next: BookingStatus,
    ) -> Result<Booking, LedgerError>;
}

/// Read-only view of the class catalog.
#[async_trait]
pub trait ClassCatalog: Send + Sync + 'static {
    /// Resolve a class identifier to its published slot, if present.
    async fn class_slot(&self, class_id: ClassId) -> Option<ClassSlot>;
}

/// Outcome of an admission or cancellation decision, as reported to the
/// notification dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingOutcome {
    /// Request admitted; a booking was persisted.
    Admitted,
    /// Request rejected: member already held an active booking.
    RejectedDuplicate,
    /// Request rejected: capacity exhausted.
    RejectedCapacity,
    /// An active booking was cancelled.
    Cancelled,
    /// An active booking was marked attended.
    Attended,
}

/// Notification payload describing a decided booking outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingNote {
    /// Member the outcome concerns.
    pub member_id: MemberId,
    /// Class the outcome concerns.
    pub class_id: ClassId,
    /// Session date.
    pub date: NaiveDate,
    /// The decided outcome.
    pub outcome: BookingOutcome,
}

/// Best-effort outbound notification dispatch.
///
/// Invoked on the spawner after a decision commits; failures are logged and
/// never roll back or delay the decision.
#[async_trait]
pub trait BookingNotifier: Send + Sync + 'static {
    /// Deliver an outcome notification. Errors carry context for logging only.
    async fn notify(&self, note: BookingNote) -> Result<(), String>;
}

/// Authorization policy for the cancellation path.
pub trait CancelAuthorizer: Send + Sync + 'static {
    /// Whether `actor_id` may cancel `booking`.
    fn can_cancel(&self, actor_id: MemberId, booking: &Booking) -> bool;
}

/// Default policy: only the owning member may cancel.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOnly;

impl CancelAuthorizer for OwnerOnly {
    fn can_cancel(&self, actor_id: MemberId, booking: &Booking) -> bool {
        actor_id == booking.member_id
    }
}

/// Abstraction for spawning detached work on a runtime.
pub trait Spawn: Send + Sync + 'static {
    /// Spawn an async task that runs to completion independently of the
    /// submitting caller.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
