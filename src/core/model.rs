//! Domain models for classes, bookings, and admission requests.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a scheduled class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(pub Uuid);

impl ClassId {
    /// Generate a fresh class identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a member (or staff actor on the cancellation path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub Uuid);

impl MemberId {
    /// Generate a fresh member identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a booking record in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub Uuid);

impl BookingId {
    /// Generate a fresh booking identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A scheduled class as published by the catalog.
///
/// Read-only to the admission core; catalog management owns its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSlot {
    /// Class identifier.
    pub class_id: ClassId,
    /// Maximum simultaneously active bookings per date. Always `> 0`.
    pub capacity: u32,
    /// Days of week on which the class runs.
    pub scheduled_days: Vec<Weekday>,
    /// Session start time.
    pub start_time: NaiveTime,
    /// Session end time.
    pub end_time: NaiveTime,
    /// Whether the class has been withdrawn from the schedule.
    pub cancelled: bool,
}

impl ClassSlot {
    /// Whether `date` falls on one of the class's scheduled weekdays.
    #[must_use]
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.scheduled_days.contains(&date.weekday())
    }
}

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Active reservation counting toward class capacity.
    Booked,
    /// Released by the member or an admin; the slot is free again. Terminal.
    Cancelled,
    /// Member attended the session. Terminal.
    Attended,
}

impl BookingStatus {
    /// Whether a transition from `self` to `next` is legal.
    ///
    /// Only `Booked -> Cancelled` and `Booked -> Attended` are allowed;
    /// terminal states never transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Booked, Self::Cancelled) | (Self::Booked, Self::Attended)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Booked => "BOOKED",
            Self::Cancelled => "CANCELLED",
            Self::Attended => "ATTENDED",
        };
        f.write_str(s)
    }
}

/// A booking record in the ledger.
///
/// `date` is immutable after creation; records are never physically deleted,
/// status carries the soft state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Ledger key.
    pub booking_id: BookingId,
    /// Owning member.
    pub member_id: MemberId,
    /// Booked class.
    pub class_id: ClassId,
    /// Session date the reservation is for.
    pub date: NaiveDate,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Optional free-form note supplied at request time.
    pub note: Option<String>,
    /// Creation timestamp, milliseconds since epoch.
    pub created_at_ms: u128,
}

impl Booking {
    /// Build a fresh `Booked` record for an admitted request.
    #[must_use]
    pub fn admitted(
        member_id: MemberId,
        class_id: ClassId,
        date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self {
            booking_id: BookingId::new(),
            member_id,
            class_id,
            date,
            status: BookingStatus::Booked,
            note,
            created_at_ms: crate::util::clock::now_ms(),
        }
    }

    /// Whether this record holds a capacity slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Booked
    }
}

/// Inbound booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Requesting member.
    pub member_id: MemberId,
    /// Target class.
    pub class_id: ClassId,
    /// Target session date.
    pub date: NaiveDate,
    /// Optional note carried onto the booking.
    pub note: Option<String>,
}
