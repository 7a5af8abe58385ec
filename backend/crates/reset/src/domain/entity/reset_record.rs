//! Reset Record Entity
//!
//! Server-side state for one issued token: its hash, its expiry, and
//! whether it has been consumed.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::TokenHash;
use platform::client::RequestMeta;

/// A single issued reset token's server-side record.
///
/// Created once by the issuer; mutated exactly once, by the redeemer,
/// to set `used_at`. Multiple records may exist per account; each lives
/// and dies on its own expiry.
#[derive(Debug, Clone)]
pub struct ResetRecord {
    pub reset_id: Uuid,
    pub account_id: Uuid,
    /// Lowercase hex SHA-256 of the token; not enforced unique, collisions
    /// surface as "no match" at lookup
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    /// NULL until consumed; a set value makes the record dead forever
    pub used_at: Option<DateTime<Utc>>,
    /// Requester network origin captured at issuance
    pub request_ip: Option<String>,
    pub request_ua: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ResetRecord {
    /// Create a record for a freshly issued token.
    pub fn new(account_id: Uuid, token_hash: &TokenHash, ttl: Duration, meta: &RequestMeta) -> Self {
        let now = Utc::now();
        Self {
            reset_id: Uuid::new_v4(),
            account_id,
            token_hash: token_hash.as_str().to_string(),
            expires_at: now + ttl,
            used_at: None,
            request_ip: meta.ip_string(),
            request_ua: meta.user_agent.clone(),
            created_at: now,
        }
    }

    /// Redeemable iff never consumed and strictly before expiry.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
