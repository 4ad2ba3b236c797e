//! Contended admission suites.
//!
//! These tests validate the externally observable guarantee:
//! 1. N concurrent requests against capacity C admit exactly min(N, C)
//! 2. The rest are rejected with CapacityExceeded
//! 3. M concurrent requests from one member admit exactly 1
//! 4. The persisted BOOKED count matches the admitted count
//! 5. Rejections are idempotent decisions, not faults

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, Weekday};
use futures::future::join_all;
use slotgate::core::{
    AdmissionController, AdmissionError, BookingRequest, ClassId, ClassSlot, MemberId, OwnerOnly,
    Spawn,
};
use slotgate::infra::{InMemoryCatalog, InMemoryLedger, RecordingNotifier};
use tokio::sync::Barrier;

// Simple tokio spawner for tests
#[derive(Clone)]
struct TestSpawner;

impl Spawn for TestSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}

type TestController =
    AdmissionController<InMemoryLedger, InMemoryCatalog, RecordingNotifier, OwnerOnly, TestSpawner>;

struct Harness {
    controller: Arc<TestController>,
    ledger: Arc<InMemoryLedger>,
    notifier: Arc<RecordingNotifier>,
    class_id: ClassId,
}

// A Monday; the published slot runs on Mondays.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn harness(capacity: u32) -> Harness {
    let ledger = Arc::new(InMemoryLedger::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let class_id = ClassId::new();

    catalog.publish(ClassSlot {
        class_id,
        capacity,
        scheduled_days: vec![Weekday::Mon],
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        cancelled: false,
    });

    let controller = Arc::new(AdmissionController::new(
        Arc::clone(&ledger),
        catalog,
        Arc::clone(&notifier),
        OwnerOnly,
        TestSpawner,
    ));

    Harness {
        controller,
        ledger,
        notifier,
        class_id,
    }
}

fn request(member_id: MemberId, class_id: ClassId) -> BookingRequest {
    BookingRequest {
        member_id,
        class_id,
        date: monday(),
        note: None,
    }
}

/// Fire `requests` concurrently, released together by a barrier, and return
/// the collected outcomes.
async fn race(
    controller: &Arc<TestController>,
    requests: Vec<BookingRequest>,
) -> Vec<Result<slotgate::core::Booking, AdmissionError>> {
    let barrier = Arc::new(Barrier::new(requests.len()));
    let mut handles = Vec::with_capacity(requests.len());

    for req in requests {
        let controller = Arc::clone(controller);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            controller.request_booking(req).await
        }));
    }

    join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect()
}

#[tokio::test]
async fn test_capacity_one_ten_distinct_members() {
    let h = harness(1);
    let requests = (0..10)
        .map(|_| request(MemberId::new(), h.class_id))
        .collect();

    let outcomes = race(&h.controller, requests).await;

    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    let capacity_rejected = outcomes
        .iter()
        .filter(|o| matches!(o, Err(AdmissionError::CapacityExceeded)))
        .count();

    assert_eq!(admitted, 1);
    assert_eq!(capacity_rejected, 9);
    assert_eq!(h.ledger.active_count_now(h.class_id, monday()), 1);
    assert_eq!(h.ledger.record_count(), 1);
}

#[tokio::test]
async fn test_capacity_ten_twenty_distinct_members() {
    let h = harness(10);
    let requests = (0..20)
        .map(|_| request(MemberId::new(), h.class_id))
        .collect();

    let outcomes = race(&h.controller, requests).await;

    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    let capacity_rejected = outcomes
        .iter()
        .filter(|o| matches!(o, Err(AdmissionError::CapacityExceeded)))
        .count();

    assert_eq!(admitted, 10);
    assert_eq!(capacity_rejected, 10);
    assert_eq!(h.ledger.active_count_now(h.class_id, monday()), 10);
}

#[tokio::test]
async fn test_same_member_five_concurrent_requests() {
    let h = harness(10);
    let member = MemberId::new();
    let requests = (0..5).map(|_| request(member, h.class_id)).collect();

    let outcomes = race(&h.controller, requests).await;

    let admitted = outcomes.iter().filter(|o| o.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|o| matches!(o, Err(AdmissionError::DuplicateBooking)))
        .count();

    assert_eq!(admitted, 1);
    assert_eq!(duplicates, 4);
    // Plenty of capacity left; only the duplicate rule fired.
    assert_eq!(h.ledger.active_count_now(h.class_id, monday()), 1);
}

#[tokio::test]
async fn test_duplicate_rejection_is_idempotent() {
    let h = harness(5);
    let member = MemberId::new();

    h.controller
        .request_booking(request(member, h.class_id))
        .await
        .unwrap();

    // Every retry gets the same decision, never a fault.
    for _ in 0..3 {
        let outcome = h
            .controller
            .request_booking(request(member, h.class_id))
            .await;
        assert!(matches!(outcome, Err(AdmissionError::DuplicateBooking)));
    }
    assert_eq!(h.ledger.active_count_now(h.class_id, monday()), 1);
}

#[tokio::test]
async fn test_unknown_class_is_rejected() {
    let h = harness(5);
    let outcome = h
        .controller
        .request_booking(request(MemberId::new(), ClassId::new()))
        .await;
    assert!(matches!(outcome, Err(AdmissionError::ClassNotFound)));
    assert_eq!(h.ledger.record_count(), 0);
}

#[tokio::test]
async fn test_unscheduled_day_is_rejected() {
    let h = harness(5);
    let mut req = request(MemberId::new(), h.class_id);
    // 2026-03-03 is a Tuesday; the class runs Mondays.
    req.date = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();

    let outcome = h.controller.request_booking(req).await;
    assert!(matches!(outcome, Err(AdmissionError::InvalidDate)));
    assert_eq!(h.ledger.record_count(), 0);
}

#[tokio::test]
async fn test_withdrawn_class_is_rejected() {
    let ledger = Arc::new(InMemoryLedger::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let class_id = ClassId::new();
    catalog.publish(ClassSlot {
        class_id,
        capacity: 5,
        scheduled_days: vec![Weekday::Mon],
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        cancelled: false,
    });
    catalog.withdraw(class_id);

    let controller = AdmissionController::new(
        Arc::clone(&ledger),
        catalog,
        Arc::new(RecordingNotifier::new()),
        OwnerOnly,
        TestSpawner,
    );

    let outcome = controller
        .request_booking(request(MemberId::new(), class_id))
        .await;
    assert!(matches!(outcome, Err(AdmissionError::ClassNotFound)));
}

#[tokio::test]
async fn test_every_decision_is_notified() {
    let h = harness(3);
    let requests = (0..8)
        .map(|_| request(MemberId::new(), h.class_id))
        .collect();

    race(&h.controller, requests).await;

    // Dispatch is detached; give the spawned notify tasks a moment.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let notes = h.notifier.notes();
    assert_eq!(notes.len(), 8);
    let admitted = notes
        .iter()
        .filter(|n| n.outcome == slotgate::core::BookingOutcome::Admitted)
        .count();
    let rejected = notes
        .iter()
        .filter(|n| n.outcome == slotgate::core::BookingOutcome::RejectedCapacity)
        .count();
    assert_eq!(admitted, 3);
    assert_eq!(rejected, 5);
}

#[tokio::test]
async fn test_gate_registry_prunes_after_quiescence() {
    let h = harness(2);
    race(
        &h.controller,
        (0..4).map(|_| request(MemberId::new(), h.class_id)).collect(),
    )
    .await;

    // All sections have finished; the key's gate is idle and reclaimable.
    assert_eq!(h.controller.prune_idle_gates(), 1);
}
