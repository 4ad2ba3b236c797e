//! In-memory booking ledger.
//!
//! The default backend for development and for the concurrency suites. It
//! enforces the same constraints a production database would: the
//! one-active-booking uniqueness rule on insert and the legal-transition
//! rule on status updates. Because the constraint is enforced inside one
//! mutex-guarded step, the backend is safe to hammer from many tasks, which
//! is exactly what the contention tests do.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::core::error::LedgerError;
use crate::core::model::{Booking, BookingId, BookingStatus, ClassId, MemberId};
use crate::core::ports::BookingLedger;

/// Key of the active-booking uniqueness index.
type ActiveKey = (MemberId, ClassId, NaiveDate);

#[derive(Default)]
struct LedgerState {
    bookings: HashMap<BookingId, Booking>,
    /// Index mirroring the partial unique constraint: one `Booked` record
    /// per member/class/date.
    active: HashSet<ActiveKey>,
}

/// In-memory ledger guarded by a single mutex.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the live `Booked` count for a class and date.
    ///
    /// Same answer as [`BookingLedger::count_active`] but synchronous, so a
    /// sampling task can observe the ledger mid-run without awaiting.
    #[must_use]
    pub fn active_count_now(&self, class_id: ClassId, date: NaiveDate) -> u32 {
        let state = self.state.lock();
        u32::try_from(
            state
                .active
                .iter()
                .filter(|(_, c, d)| *c == class_id && *d == date)
                .count(),
        )
        .unwrap_or(u32::MAX)
    }

    /// Total number of records ever written (any status).
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.state.lock().bookings.len()
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn insert(&self, booking: Booking) -> Result<(), LedgerError> {
        if booking.status != BookingStatus::Booked {
            return Err(LedgerError::Backend(
                "only Booked records may be inserted".into(),
            ));
        }
        let key = (booking.member_id, booking.class_id, booking.date);
        let mut state = self.state.lock();
        if !state.active.insert(key) {
            return Err(LedgerError::DuplicateActive);
        }
        state.bookings.insert(booking.booking_id, booking);
        Ok(())
    }

    async fn find_active(
        &self,
        member_id: MemberId,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Option<Booking>, LedgerError> {
        let state = self.state.lock();
        if !state.active.contains(&(member_id, class_id, date)) {
            return Ok(None);
        }
        Ok(state
            .bookings
            .values()
            .find(|b| {
                b.is_active() && b.member_id == member_id && b.class_id == class_id && b.date == date
            })
            .cloned())
    }

    async fn count_active(&self, class_id: ClassId, date: NaiveDate) -> Result<u32, LedgerError> {
        Ok(self.active_count_now(class_id, date))
    }

    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>, LedgerError> {
        Ok(self.state.lock().bookings.get(&booking_id).cloned())
    }

    async fn transition(
        &self,
        booking_id: BookingId,
        next: BookingStatus,
    ) -> Result<Booking, LedgerError> {
        let mut state = self.state.lock();
        let Some(booking) = state.bookings.get(&booking_id).cloned() else {
            return Err(LedgerError::Backend(format!(
                "booking {booking_id} not found"
            )));
        };
        if !booking.status.can_transition_to(next) {
            return Err(LedgerError::Backend(format!(
                "illegal transition {} -> {next}",
                booking.status
            )));
        }
        state
            .active
            .remove(&(booking.member_id, booking.class_id, booking.date));
        let updated = Booking {
            status: next,
            ..booking
        };
        state.bookings.insert(booking_id, updated.clone());
        Ok(updated)
    }
}
