//! Value Objects

pub mod identifier;
pub mod reset_token;

pub use identifier::Identifier;
pub use reset_token::{ResetToken, TokenHash};
