//! Reset (Credential Recovery) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, runtime config, audit and mail facades
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Single-use, 30-minute reset tokens delivered out of band
//! - Anti-enumeration: every reset request gets the same acknowledgement
//! - Password strength policy enforced at redemption
//! - Append-only audit trail of every lifecycle transition
//! - Hot-reloadable SMTP settings with a lazily rebuilt transport
//!
//! ## Security Model
//! - Tokens: 256 bits of CSPRNG entropy, base64url, never stored or logged
//!   in plaintext; only the SHA-256 hash is persisted
//! - Redemption compares hashes in constant time and consumes the record
//!   with a conditional update, so concurrent redeemers get one winner
//! - Account credentials hashed with Argon2id (optional pepper)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::ResetConfig;
pub use application::mailer::{LogMailSender, MailSender, Mailer, SmtpSettings};
pub use error::{ResetError, ResetResult};
pub use infra::memory::MemoryResetRepository;
pub use infra::postgres::PgResetRepository;
pub use presentation::router::{reset_router, reset_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
