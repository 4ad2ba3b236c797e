//! Audit sink implementations.
//!
//! Every admission decision is auditable: who asked, which class and date,
//! and how the controller ruled. Provides an in-memory sink for tests/dev
//! and a Postgres schema definition for durable audit persistence.

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::core::model::{ClassId, MemberId};
use crate::util::clock::now_ms;

/// Decision kind recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Request admitted; a booking was persisted.
    Admit,
    /// Request rejected: duplicate active booking.
    RejectDuplicate,
    /// Request rejected: capacity exhausted.
    RejectCapacity,
    /// Active booking cancelled.
    Cancel,
    /// Active booking marked attended.
    Attend,
}

impl AuditAction {
    /// Stable wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admit => "admit",
            Self::RejectDuplicate => "reject_duplicate",
            Self::RejectCapacity => "reject_capacity",
            Self::Cancel => "cancel",
            Self::Attend => "attend",
        }
    }
}

/// One audited admission decision.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Member the decision concerns.
    pub member_id: MemberId,
    /// Class the decision concerns.
    pub class_id: ClassId,
    /// Session date.
    pub date: NaiveDate,
    /// Decision kind.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Postgres-backed audit sink (schema-only; DB I/O not wired).
pub struct PostgresAuditSink;

impl PostgresAuditSink {
    /// Returns SQL migration statements for the decision audit log.
    #[must_use]
    pub fn migrations() -> &'static [&'static str] {
        &[
            r#"
CREATE TABLE IF NOT EXISTS sg_audit_decisions (
    event_id TEXT PRIMARY KEY,
    member_id UUID NOT NULL,
    class_id UUID NOT NULL,
    class_date DATE NOT NULL,
    action TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_sg_audit_decisions_member ON sg_audit_decisions (member_id, created_at);
CREATE INDEX IF NOT EXISTS idx_sg_audit_decisions_class ON sg_audit_decisions (class_id, class_date);
"#,
        ]
    }
}

impl AuditSink for PostgresAuditSink {
    fn record(&mut self, _event: AuditEvent) {
        // Stub: actual DB writes require a runtime + client; left to integration layer.
    }
}

/// Helper to build an audit event from decision context.
#[must_use]
pub fn build_audit_event(
    member_id: MemberId,
    class_id: ClassId,
    date: NaiveDate,
    action: AuditAction,
) -> AuditEvent {
    let created_at_ms = now_ms();
    AuditEvent {
        event_id: format!("{member_id}-{}-{created_at_ms}", action.as_str()),
        member_id,
        class_id,
        date,
        action,
        created_at_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action: AuditAction) -> AuditEvent {
        build_audit_event(
            MemberId::new(),
            ClassId::new(),
            NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            action,
        )
    }

    #[test]
    fn test_bounded_buffer_drops_oldest() {
        let mut sink = InMemoryAuditSink::new(2);
        sink.record(event(AuditAction::Admit));
        sink.record(event(AuditAction::RejectCapacity));
        sink.record(event(AuditAction::Cancel));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AuditAction::RejectCapacity);
        assert_eq!(events[1].action, AuditAction::Cancel);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::RejectDuplicate.as_str(), "reject_duplicate");
        assert_eq!(AuditAction::Attend.as_str(), "attend");
    }
}
