//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Account, AuditEvent, AuditKind, OutboxEmail, ResetRecord};
pub use repository::{
    AccountRepository, AuditRepository, OutboxRepository, RateLimitRepository,
    ResetRecordRepository,
};
pub use value_object::{Identifier, ResetToken, TokenHash};
