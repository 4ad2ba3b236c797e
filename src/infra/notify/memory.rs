//! Recording notifier for tests and development.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::ports::{BookingNote, BookingNotifier};

/// Notifier that records every delivered note for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<BookingNote>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of delivered notes in delivery order.
    #[must_use]
    pub fn notes(&self) -> Vec<BookingNote> {
        self.notes.lock().clone()
    }

    /// Number of delivered notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    /// Whether nothing has been delivered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.lock().is_empty()
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn notify(&self, note: BookingNote) -> Result<(), String> {
        self.notes.lock().push(note);
        Ok(())
    }
}
