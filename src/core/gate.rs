//! Per-slot admission gates.
//!
//! Admission and cancellation for the same `(class, date)` key must be
//! linearized with respect to each other; unrelated keys must not contend.
//! The registry itself is guarded by a fast `parking_lot::Mutex`, while each
//! entry is an awaitable `tokio::sync::Mutex` so a holder can perform ledger
//! I/O inside the critical section without blocking a runtime thread.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;

use crate::core::model::ClassId;

/// Key identifying one contended capacity pool: a class on a date.
pub type SlotKey = (ClassId, NaiveDate);

/// Registry of per-slot mutual-exclusion gates.
///
/// Entries are created on first use and can be pruned once idle; the
/// registry never serializes operations across distinct keys.
#[derive(Default)]
pub struct SlotGates {
    gates: Mutex<HashMap<SlotKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SlotGates {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the gate for `key`, waiting if another admission or
    /// cancellation for the same key holds it. The guard is owned so it can
    /// be carried into a spawned critical section.
    pub async fn acquire(&self, class_id: ClassId, date: NaiveDate) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock();
            Arc::clone(gates.entry((class_id, date)).or_default())
        };
        // Registry lock is released before awaiting; only same-key callers
        // queue here.
        gate.lock_owned().await
    }

    /// Drop gate entries with no outstanding holders or waiters.
    ///
    /// Past dates accumulate one entry each; callers run this as periodic
    /// housekeeping. Returns the number of entries removed.
    pub fn prune_idle(&self) -> usize {
        let mut gates = self.gates.lock();
        let before = gates.len();
        gates.retain(|_, gate| Arc::strong_count(gate) > 1 || gate.try_lock().is_err());
        before - gates.len()
    }

    /// Number of registered gate entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.lock().len()
    }

    /// Whether the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.lock().is_empty()
    }
}
