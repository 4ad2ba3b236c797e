//! Notification dispatch backends.

pub mod memory;

use async_trait::async_trait;

use crate::core::ports::{BookingNote, BookingNotifier};

pub use memory::RecordingNotifier;

/// Notifier that emits a structured log line per outcome.
///
/// The default production dispatcher until a real messaging integration is
/// wired; best-effort by construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl BookingNotifier for TracingNotifier {
    async fn notify(&self, note: BookingNote) -> Result<(), String> {
        tracing::info!(
            member = %note.member_id,
            class = %note.class_id,
            date = %note.date,
            outcome = ?note.outcome,
            "booking outcome"
        );
        Ok(())
    }
}
