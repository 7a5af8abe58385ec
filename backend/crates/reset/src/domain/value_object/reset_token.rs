//! Reset Token Value Objects
//!
//! [`ResetToken`] is the plaintext bearer secret handed to the delivery
//! path exactly once. [`TokenHash`] is the only form that may be stored,
//! compared or (as a short prefix) audited.

use std::fmt;

use platform::crypto::{constant_time_eq, random_bytes, sha256, to_base64_url, to_hex};

/// Token entropy in bytes (256 bits)
const TOKEN_BYTES: usize = 32;

/// Hex characters of the hash exposed in audit details for correlation
const AUDIT_PREFIX_LEN: usize = 8;

/// Plaintext reset token.
///
/// High-entropy, URL-safe, single-use. Debug output is redacted; the only
/// way to read the secret is [`ResetToken::expose`], used when embedding it
/// in the redemption link.
pub struct ResetToken(String);

impl ResetToken {
    /// Generate a fresh token: 32 CSPRNG bytes, base64url without padding,
    /// so it embeds in a link with no escaping artifacts.
    pub fn generate() -> Self {
        Self(to_base64_url(&random_bytes(TOKEN_BYTES)))
    }

    /// The plaintext secret. Call sites must never log this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Storage hash of this token.
    pub fn hash(&self) -> TokenHash {
        TokenHash::of(&self.0)
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResetToken").field(&"[REDACTED]").finish()
    }
}

/// SHA-256 hash of a reset token, lowercase hex.
///
/// A fast hash is deliberate: the token itself carries 256 bits of entropy,
/// so the hash's only job is to keep the bearer secret out of the database.
/// An adaptive hash here would add latency, not security.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHash(String);

impl TokenHash {
    /// Hash a presented plaintext token.
    pub fn of(token: &str) -> Self {
        Self(to_hex(&sha256(token.as_bytes())))
    }

    /// Wrap a hash loaded from storage.
    pub fn from_stored(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against another hash.
    ///
    /// Redemption must never take a data-dependent-time path on the secret,
    /// even when an equality-filtered lookup already matched.
    pub fn ct_eq(&self, other: &TokenHash) -> bool {
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }

    /// Short non-reversible prefix, safe to record in audit details.
    pub fn audit_prefix(&self) -> &str {
        &self.0[..AUDIT_PREFIX_LEN.min(self.0.len())]
    }
}
