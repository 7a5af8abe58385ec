//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations:
//! - Cryptographic utilities (SHA-256, hex, URL-safe Base64, CSPRNG)
//! - Password hashing (Argon2id) and the reset credential policy
//! - Request metadata extraction (client IP, User-Agent)
//! - Rate limiting configuration

pub mod client;
pub mod crypto;
pub mod password;
pub mod rate_limit;
