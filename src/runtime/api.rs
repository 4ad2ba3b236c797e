//! API-facing request/response models.
//!
//! The web layer (out of scope here) maps these to HTTP. Reason codes are
//! stable machine-readable strings; human-facing copy belongs to the caller.

use serde::{Deserialize, Serialize};

use crate::core::error::AdmissionError;
use crate::core::model::{Booking, BookingId, BookingStatus, ClassId, MemberId};

/// Cancellation request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Booking to cancel.
    pub booking_id: BookingId,
    /// Member or staff actor asking for the cancellation.
    pub actor_id: MemberId,
}

/// Response to a booking or cancellation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// The booking on success.
    pub booking: Option<BookingView>,
    /// Stable rejection reason code on failure.
    pub reason: Option<String>,
    /// Whether the caller may usefully retry the same request.
    pub retryable: bool,
}

/// Serializable projection of a booking record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
    /// Ledger key.
    pub booking_id: BookingId,
    /// Owning member.
    pub member_id: MemberId,
    /// Booked class.
    pub class_id: ClassId,
    /// Session date (ISO 8601).
    pub date: chrono::NaiveDate,
    /// Lifecycle status.
    pub status: BookingStatus,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id,
            member_id: booking.member_id,
            class_id: booking.class_id,
            date: booking.date,
            status: booking.status,
        }
    }
}

/// Stable reason code for an admission error.
#[must_use]
pub const fn reason_code(err: &AdmissionError) -> &'static str {
    match err {
        AdmissionError::ClassNotFound => "class_not_found",
        AdmissionError::InvalidDate => "invalid_date",
        AdmissionError::DuplicateBooking => "duplicate_booking",
        AdmissionError::CapacityExceeded => "capacity_exceeded",
        AdmissionError::NotFound => "not_found",
        AdmissionError::Forbidden => "forbidden",
        AdmissionError::TransientFailure(_) => "transient_failure",
    }
}

impl BookingResponse {
    /// Build a response from a controller outcome.
    #[must_use]
    pub fn from_result(result: &Result<Booking, AdmissionError>) -> Self {
        match result {
            Ok(booking) => Self {
                ok: true,
                booking: Some(BookingView::from(booking)),
                reason: None,
                retryable: false,
            },
            Err(err) => Self {
                ok: false,
                booking: None,
                reason: Some(reason_code(err).to_string()),
                retryable: matches!(err, AdmissionError::TransientFailure(_)),
            },
        }
    }
}
