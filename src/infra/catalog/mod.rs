//! Class catalog backends.

pub mod memory;

pub use memory::InMemoryCatalog;
