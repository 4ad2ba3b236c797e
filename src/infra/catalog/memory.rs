//! In-memory class catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::model::{ClassId, ClassSlot};
use crate::core::ports::ClassCatalog;

/// In-memory catalog for development and testing.
#[derive(Default)]
pub struct InMemoryCatalog {
    slots: Mutex<HashMap<ClassId, ClassSlot>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish or replace a class slot.
    pub fn publish(&self, slot: ClassSlot) {
        self.slots.lock().insert(slot.class_id, slot);
    }

    /// Mark a class as withdrawn; it stops resolving for admission.
    pub fn withdraw(&self, class_id: ClassId) {
        if let Some(slot) = self.slots.lock().get_mut(&class_id) {
            slot.cancelled = true;
        }
    }
}

#[async_trait]
impl ClassCatalog for InMemoryCatalog {
    async fn class_slot(&self, class_id: ClassId) -> Option<ClassSlot> {
        self.slots.lock().get(&class_id).cloned()
    }
}
