//! Postgres-backed ledger adapter (schema and interface stubs).
//!
//! Carries the persisted-state contract: the bookings table, the partial
//! unique index backing the one-active-booking rule, and the count index
//! for the capacity check. Operations are stubs until a database client is
//! wired by the integration layer.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::error::LedgerError;
use crate::core::model::{Booking, BookingId, BookingStatus, ClassId, MemberId};
use crate::core::ports::BookingLedger;

/// Postgres ledger adapter placeholder.
#[derive(Default)]
pub struct PostgresLedger;

impl PostgresLedger {
    /// Create a new adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Migration statements for the booking ledger.
    ///
    /// The partial unique index enforces the duplicate rule at the store;
    /// with `SELECT ... FOR UPDATE` on the count this supports an optimistic
    /// admission strategy as an alternative to the in-process gate.
    #[must_use]
    pub fn migrations() -> &'static [&'static str] {
        &[
            r#"
CREATE TABLE IF NOT EXISTS sg_bookings (
    booking_id UUID PRIMARY KEY,
    member_id UUID NOT NULL,
    class_id UUID NOT NULL,
    class_date DATE NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('BOOKED', 'CANCELLED', 'ATTENDED')),
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_sg_bookings_active
    ON sg_bookings (member_id, class_id, class_date)
    WHERE status = 'BOOKED';
CREATE INDEX IF NOT EXISTS idx_sg_bookings_slot ON sg_bookings (class_id, class_date);
"#,
        ]
    }
}

#[async_trait]
impl BookingLedger for PostgresLedger {
    async fn insert(&self, _booking: Booking) -> Result<(), LedgerError> {
        Err(LedgerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn find_active(
        &self,
        _member_id: MemberId,
        _class_id: ClassId,
        _date: NaiveDate,
    ) -> Result<Option<Booking>, LedgerError> {
        Err(LedgerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn count_active(&self, _class_id: ClassId, _date: NaiveDate) -> Result<u32, LedgerError> {
        Err(LedgerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn get(&self, _booking_id: BookingId) -> Result<Option<Booking>, LedgerError> {
        Err(LedgerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }

    async fn transition(
        &self,
        _booking_id: BookingId,
        _next: BookingStatus,
    ) -> Result<Booking, LedgerError> {
        Err(LedgerError::Backend(
            "postgres ledger not wired to database client".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_carry_constraints() {
        let sql = PostgresLedger::migrations().join("\n");
        assert!(sql.contains("uq_sg_bookings_active"));
        assert!(sql.contains("WHERE status = 'BOOKED'"));
        assert!(sql.contains("idx_sg_bookings_slot"));
    }
}
