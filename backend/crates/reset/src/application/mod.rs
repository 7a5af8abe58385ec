//! Application Layer
//!
//! Use cases orchestrating domain objects, plus runtime config and the
//! audit/mail facades.

pub mod audit;
pub mod confirm_reset;
pub mod config;
pub mod mailer;
pub mod request_reset;

// Re-exports
pub use audit::Auditor;
pub use confirm_reset::{ConfirmResetInput, ConfirmResetUseCase};
pub use config::ResetConfig;
pub use mailer::{LogMailSender, MailError, MailMessage, MailSender, Mailer, SmtpSettings};
pub use request_reset::{RequestResetInput, RequestResetUseCase};
