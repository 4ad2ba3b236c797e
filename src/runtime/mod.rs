//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{reason_code, BookingResponse, BookingView, CancelRequest};
pub use tokio_spawner::TokioSpawner;
