//! # Slotgate
//!
//! Capacity-bounded booking admission control for scheduled classes.
//!
//! This library is the one subsystem of a gym-operations stack that carries a
//! real correctness property under concurrency: deciding, with many requests
//! in flight, whether a member may reserve one of a finite number of slots in
//! a class on a given date. The persisted `BOOKED` count for a class/date may
//! never exceed capacity, and a member may never hold two active bookings for
//! the same class and date, regardless of interleaving.
//!
//! ## Core Problem Solved
//!
//! Admission is a check-then-act sequence: count active bookings, check the
//! member's existing reservation, insert. Run naively in parallel, two
//! requests both observe a free slot and both insert. Slotgate serializes
//! the whole sequence through a per-`(class, date)` gate:
//!
//! - **Keyed gates**: unrelated classes and dates never contend
//! - **Run-to-completion**: a started critical section finishes even if the
//!   caller's future is dropped mid-decision
//! - **Constraint-backed ledger**: backends additionally enforce the
//!   one-active-booking rule, so the invariant survives backend swaps
//! - **Typed outcomes**: every rejection is a decision
//!   (`DuplicateBooking`, `CapacityExceeded`, ...), never a panic
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use slotgate::core::{AdmissionController, BookingRequest, OwnerOnly};
//! use slotgate::infra::{InMemoryCatalog, InMemoryLedger, TracingNotifier};
//! use slotgate::runtime::TokioSpawner;
//!
//! let controller = AdmissionController::new(
//!     Arc::new(InMemoryLedger::new()),
//!     Arc::new(catalog),
//!     Arc::new(TracingNotifier),
//!     OwnerOnly,
//!     TokioSpawner::new(tokio::runtime::Handle::current()),
//! );
//!
//! match controller.request_booking(request).await {
//!     Ok(booking) => println!("admitted: {}", booking.booking_id),
//!     Err(reason) => println!("rejected: {reason}"),
//! }
//! ```
//!
//! For complete examples, see:
//! - `tests/admission_concurrency_test.rs` - contended admission suites
//! - `tests/mixed_load_test.rs` - admissions racing cancellations

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core admission abstractions: domain model, decision logic, and seams.
pub mod core;
/// Configuration models for the admission service.
pub mod config;
/// Builders to construct admission components from configuration.
pub mod builders;
/// Infrastructure adapters for ledger, catalog, and notification backends.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
