//! Infrastructure Layer
//!
//! Repository implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryResetRepository;
pub use postgres::PgResetRepository;
