//! Domain Entities

pub mod account;
pub mod audit_event;
pub mod outbox_email;
pub mod reset_record;

pub use account::Account;
pub use audit_event::{AuditEvent, AuditKind};
pub use outbox_email::OutboxEmail;
pub use reset_record::ResetRecord;
