//! Admission controller: capacity-bounded booking decisions.
//!
//! `request_booking` is a check-then-act sequence (duplicate probe, capacity
//! count, insert) and is only correct when the whole sequence runs under the
//! per-`(class, date)` gate. Cancellation and attendance free a capacity
//! slot, so they take the same gate. Once a critical section starts it runs
//! to completion on the spawner; dropping the caller's future mid-decision
//! cannot leave the ledger half-written.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::error::{AdmissionError, LedgerError};
use crate::core::gate::SlotGates;
use crate::core::model::{Booking, BookingId, BookingRequest, BookingStatus, ClassId, MemberId};
use crate::core::ports::{
    BookingLedger, BookingNote, BookingNotifier, BookingOutcome, CancelAuthorizer, ClassCatalog,
    Spawn,
};

/// Bounded retry for transient ledger faults inside a critical section.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts before surfacing `TransientFailure` (minimum 1).
    pub max_attempts: u32,
    /// Base backoff between attempts; doubles per retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(25),
        }
    }
}

/// Intermediate classification of a critical-section step.
enum Step {
    /// Terminal decision or fault; reported immediately.
    Final(AdmissionError),
    /// Transient ledger fault; the section may retry under the gate.
    Transient(String),
}

fn classify(err: LedgerError) -> Step {
    match err {
        LedgerError::DuplicateActive => Step::Final(AdmissionError::DuplicateBooking),
        LedgerError::Transient(msg) => Step::Transient(msg),
        LedgerError::Backend(msg) => Step::Final(AdmissionError::TransientFailure(msg)),
    }
}

/// Surface a ledger fault from an unsynchronized pre-read.
fn ledger_fault(err: LedgerError) -> AdmissionError {
    match classify(err) {
        Step::Final(e) => e,
        Step::Transient(msg) => AdmissionError::TransientFailure(msg),
    }
}

/// The admission controller: sole writer of capacity-relevant booking state.
///
/// Generic over the collaborator seams so production backends and in-memory
/// test doubles wire in the same way.
pub struct AdmissionController<L, C, N, A, S> {
    ledger: Arc<L>,
    catalog: Arc<C>,
    notifier: Arc<N>,
    authorizer: A,
    spawner: S,
    gates: Arc<SlotGates>,
    retry: RetryPolicy,
    audit: Option<Arc<Mutex<Box<dyn AuditSink>>>>,
}

impl<L, C, N, A, S> AdmissionController<L, C, N, A, S> {
    /// Create a controller from its collaborators.
    pub fn new(ledger: Arc<L>, catalog: Arc<C>, notifier: Arc<N>, authorizer: A, spawner: S) -> Self {
        Self {
            ledger,
            catalog,
            notifier,
            authorizer,
            spawner,
            gates: Arc::new(SlotGates::new()),
            retry: RetryPolicy::default(),
            audit: None,
        }
    }

    /// Override the transient-retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attach an audit sink recording every decision.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self
    }

    /// Drop gate entries for keys with no in-flight operations.
    pub fn prune_idle_gates(&self) -> usize {
        self.gates.prune_idle()
    }

    fn record_audit(&self, member_id: MemberId, class_id: ClassId, date: chrono::NaiveDate, action: AuditAction) {
        if let Some(audit_sink) = &self.audit {
            let mut sink = audit_sink.lock();
            sink.record(build_audit_event(member_id, class_id, date, action));
        }
    }
}

impl<L, C, N, A, S> AdmissionController<L, C, N, A, S>
where
    L: BookingLedger,
    C: ClassCatalog,
    N: BookingNotifier,
    A: CancelAuthorizer,
    S: Spawn + Clone,
{
    /// Decide a booking request.
    ///
    /// Preconditions (catalog resolution, scheduled-day check) run cheap and
    /// unsynchronized; the duplicate/capacity/insert sequence runs inside
    /// the `(class, date)` gate. Returns the persisted booking on admission,
    /// or the typed rejection. Rejections mutate nothing.
    pub async fn request_booking(&self, req: BookingRequest) -> Result<Booking, AdmissionError> {
        let slot = self
            .catalog
            .class_slot(req.class_id)
            .await
            .filter(|slot| !slot.cancelled)
            .ok_or(AdmissionError::ClassNotFound)?;

        if !slot.runs_on(req.date) {
            tracing::warn!(
                class = %req.class_id,
                date = %req.date,
                "booking rejected: class does not run on requested date"
            );
            return Err(AdmissionError::InvalidDate);
        }

        // Cancelling the request while waiting here aborts with no side
        // effects; after the spawn below the section runs to completion.
        let guard = self.gates.acquire(req.class_id, req.date).await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let ledger = Arc::clone(&self.ledger);
        let retry = self.retry;
        let capacity = slot.capacity;
        let section_req = req.clone();
        self.spawner.spawn(async move {
            let decision = admit_under_gate(&*ledger, retry, capacity, &section_req).await;
            drop(guard);
            let _ = tx.send(decision);
        });

        let decision = rx
            .await
            .map_err(|_| AdmissionError::TransientFailure("admission section aborted".into()))?;

        match &decision {
            Ok(booking) => {
                tracing::info!(
                    booking = %booking.booking_id,
                    member = %req.member_id,
                    class = %req.class_id,
                    date = %req.date,
                    "booking admitted"
                );
                self.record_audit(req.member_id, req.class_id, req.date, AuditAction::Admit);
                self.dispatch_note(req.member_id, req.class_id, req.date, BookingOutcome::Admitted);
            }
            Err(AdmissionError::DuplicateBooking) => {
                tracing::info!(member = %req.member_id, class = %req.class_id, "duplicate booking rejected");
                self.record_audit(req.member_id, req.class_id, req.date, AuditAction::RejectDuplicate);
                self.dispatch_note(
                    req.member_id,
                    req.class_id,
                    req.date,
                    BookingOutcome::RejectedDuplicate,
                );
            }
            Err(AdmissionError::CapacityExceeded) => {
                tracing::info!(member = %req.member_id, class = %req.class_id, "capacity-exceeded rejection");
                self.record_audit(req.member_id, req.class_id, req.date, AuditAction::RejectCapacity);
                self.dispatch_note(
                    req.member_id,
                    req.class_id,
                    req.date,
                    BookingOutcome::RejectedCapacity,
                );
            }
            Err(err) => {
                tracing::error!(member = %req.member_id, class = %req.class_id, %err, "admission failed");
            }
        }
        decision
    }

    /// Cancel an active booking, freeing its capacity slot.
    ///
    /// Runs the status transition inside the same `(class, date)` gate as
    /// admission: freeing a slot races with concurrent admissions on the
    /// same capacity count.
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        actor_id: MemberId,
    ) -> Result<Booking, AdmissionError> {
        let target = self
            .ledger
            .get(booking_id)
            .await
            .map_err(ledger_fault)?
            .filter(Booking::is_active)
            .ok_or(AdmissionError::NotFound)?;

        if !self.authorizer.can_cancel(actor_id, &target) {
            tracing::warn!(booking = %booking_id, actor = %actor_id, "cancellation forbidden");
            return Err(AdmissionError::Forbidden);
        }

        let cancelled = self
            .transition(booking_id, target.class_id, target.date, BookingStatus::Cancelled)
            .await?;

        tracing::info!(booking = %booking_id, class = %cancelled.class_id, "booking cancelled");
        self.record_audit(
            cancelled.member_id,
            cancelled.class_id,
            cancelled.date,
            AuditAction::Cancel,
        );
        self.dispatch_note(
            cancelled.member_id,
            cancelled.class_id,
            cancelled.date,
            BookingOutcome::Cancelled,
        );
        Ok(cancelled)
    }

    /// Mark an active booking attended (staff-side; terminal).
    pub async fn mark_attended(&self, booking_id: BookingId) -> Result<Booking, AdmissionError> {
        let target = self
            .ledger
            .get(booking_id)
            .await
            .map_err(ledger_fault)?
            .filter(Booking::is_active)
            .ok_or(AdmissionError::NotFound)?;

        let attended = self
            .transition(booking_id, target.class_id, target.date, BookingStatus::Attended)
            .await?;

        tracing::info!(booking = %booking_id, class = %attended.class_id, "attendance recorded");
        self.record_audit(
            attended.member_id,
            attended.class_id,
            attended.date,
            AuditAction::Attend,
        );
        self.dispatch_note(
            attended.member_id,
            attended.class_id,
            attended.date,
            BookingOutcome::Attended,
        );
        Ok(attended)
    }

    /// Run a terminal status transition under the slot gate, detached from
    /// caller cancellation.
    async fn transition(
        &self,
        booking_id: BookingId,
        class_id: ClassId,
        date: chrono::NaiveDate,
        next: BookingStatus,
    ) -> Result<Booking, AdmissionError> {
        let guard = self.gates.acquire(class_id, date).await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let ledger = Arc::clone(&self.ledger);
        let retry = self.retry;
        self.spawner.spawn(async move {
            let outcome = transition_under_gate(&*ledger, retry, booking_id, next).await;
            drop(guard);
            let _ = tx.send(outcome);
        });

        rx.await
            .map_err(|_| AdmissionError::TransientFailure("transition section aborted".into()))?
    }

    /// Fire-and-forget outcome notification; failure never affects the
    /// stored decision.
    fn dispatch_note(
        &self,
        member_id: MemberId,
        class_id: ClassId,
        date: chrono::NaiveDate,
        outcome: BookingOutcome,
    ) {
        let notifier = Arc::clone(&self.notifier);
        let note = BookingNote {
            member_id,
            class_id,
            date,
            outcome,
        };
        self.spawner.spawn(async move {
            if let Err(err) = notifier.notify(note).await {
                tracing::warn!(member = %member_id, %err, "notification dispatch failed");
            }
        });
    }
}

/// The admission critical section: duplicate probe, capacity count, insert.
///
/// Caller holds the `(class, date)` gate for the whole call. Transient
/// ledger faults re-run the full sequence after backoff, up to the policy
/// bound.
async fn admit_under_gate<L: BookingLedger>(
    ledger: &L,
    retry: RetryPolicy,
    capacity: u32,
    req: &BookingRequest,
) -> Result<Booking, AdmissionError> {
    let mut attempt = 0u32;
    loop {
        match try_admit(ledger, capacity, req).await {
            Ok(booking) => return Ok(booking),
            Err(Step::Final(err)) => return Err(err),
            Err(Step::Transient(msg)) => {
                attempt += 1;
                if attempt >= retry.max_attempts.max(1) {
                    tracing::error!(member = %req.member_id, %msg, "transient retries exhausted");
                    return Err(AdmissionError::TransientFailure(msg));
                }
                let delay = retry.backoff * 2u32.saturating_pow(attempt - 1);
                tracing::warn!(
                    member = %req.member_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient ledger fault, retrying under gate"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_admit<L: BookingLedger>(
    ledger: &L,
    capacity: u32,
    req: &BookingRequest,
) -> Result<Booking, Step> {
    if ledger
        .find_active(req.member_id, req.class_id, req.date)
        .await
        .map_err(classify)?
        .is_some()
    {
        return Err(Step::Final(AdmissionError::DuplicateBooking));
    }

    let count = ledger
        .count_active(req.class_id, req.date)
        .await
        .map_err(classify)?;
    if count >= capacity {
        return Err(Step::Final(AdmissionError::CapacityExceeded));
    }

    let booking = Booking::admitted(req.member_id, req.class_id, req.date, req.note.clone());
    match ledger.insert(booking.clone()).await {
        Ok(()) => Ok(booking),
        Err(err) => Err(classify(err)),
    }
}

/// Terminal-transition critical section with the same retry discipline as
/// admission. Re-checks the record inside the gate: a concurrent transition
/// that won the race surfaces as `NotFound`.
async fn transition_under_gate<L: BookingLedger>(
    ledger: &L,
    retry: RetryPolicy,
    booking_id: BookingId,
    next: BookingStatus,
) -> Result<Booking, AdmissionError> {
    let mut attempt = 0u32;
    loop {
        match try_transition(ledger, booking_id, next).await {
            Ok(booking) => return Ok(booking),
            Err(Step::Final(err)) => return Err(err),
            Err(Step::Transient(msg)) => {
                attempt += 1;
                if attempt >= retry.max_attempts.max(1) {
                    tracing::error!(booking = %booking_id, %msg, "transient retries exhausted");
                    return Err(AdmissionError::TransientFailure(msg));
                }
                let delay = retry.backoff * 2u32.saturating_pow(attempt - 1);
                tracing::warn!(booking = %booking_id, attempt, "transient ledger fault, retrying under gate");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_transition<L: BookingLedger>(
    ledger: &L,
    booking_id: BookingId,
    next: BookingStatus,
) -> Result<Booking, Step> {
    let current = ledger.get(booking_id).await.map_err(classify)?;
    if !current.as_ref().is_some_and(Booking::is_active) {
        return Err(Step::Final(AdmissionError::NotFound));
    }
    ledger.transition(booking_id, next).await.map_err(classify)
}
