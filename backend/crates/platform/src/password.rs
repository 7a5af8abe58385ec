//! Password Hashing and Verification
//!
//! Argon2id hashing for long-term account credentials plus the strength
//! policy applied to replacement passwords during a reset.
//!
//! ## Security Features
//! - Memory-hard hashing resists GPU/ASIC offline guessing
//! - Zeroization prevents memory inspection attacks
//! - Pepper support for an additional application-wide secret
//!
//! The fast hash used for reset tokens is NOT here on purpose: tokens carry
//! their own entropy and are hashed with plain SHA-256 (see `crypto`).
//! Using Argon2 for tokens would burn latency without adding security;
//! using SHA-256 for passwords would be insecure.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum length for a caller-chosen replacement password
pub const MIN_PASSWORD_LENGTH: usize = 14;

/// Entropy of generated throwaway credentials, in bytes
const GENERATED_CREDENTIAL_BYTES: usize = 24;

/// Passwords containing any of these as a substring are rejected.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "qwerty",
    "letmein",
    "welcome",
    "admin",
    "iloveyou",
    "123456",
    "123456789",
    "12345678",
    "111111",
    "monkey",
    "dragon",
];

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors.
///
/// The display strings are part of the public API contract: they are
/// returned verbatim to callers whose new password fails the policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {0} characters.")]
    TooShort(usize),

    #[error("Password must include a lowercase letter.")]
    MissingLowercase,

    #[error("Password must include an uppercase letter.")]
    MissingUppercase,

    #[error("Password must include a number.")]
    MissingDigit,

    #[error("Password must include a symbol.")]
    MissingSymbol,

    #[error("Password is too common.")]
    TooCommon,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Strength policy
// ============================================================================

/// Validate a caller-chosen password against the reset strength policy.
///
/// Rules, checked in order so the first failure names the missing rule:
/// minimum length, lowercase, uppercase, digit, symbol, common-substring
/// denylist (case-insensitive).
pub fn check_password_policy(password: &str) -> Result<(), PasswordPolicyError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort(MIN_PASSWORD_LENGTH));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PasswordPolicyError::MissingSymbol);
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|c| lowered.contains(c)) {
        return Err(PasswordPolicyError::TooCommon);
    }
    Ok(())
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization.
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Accept a caller-chosen password, normalized (NFKC) and validated
    /// against the strength policy.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();
        check_password_policy(&normalized)?;
        Ok(Self(normalized))
    }

    /// Generate a random throwaway credential for a provisioned account.
    ///
    /// Skips the human-password policy: 24 bytes of CSPRNG output encoded
    /// as base64url carry far more entropy than the policy demands. Nobody
    /// is expected to ever type this password.
    pub fn generate() -> Self {
        let bytes = crate::crypto::random_bytes(GENERATED_CREDENTIAL_BYTES);
        Self(crate::crypto::to_base64_url(&bytes))
    }

    /// Create without validation (for testing)
    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the password using Argon2id.
    ///
    /// ## Arguments
    /// * `pepper` - Optional application-wide secret appended before hashing
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let password_bytes = match pepper {
            Some(p) => {
                let mut combined = self.as_bytes().to_vec();
                combined.extend_from_slice(p);
                combined
            }
            None => self.as_bytes().to_vec(),
        };

        // Random 128-bit salt; OWASP-recommended Argon2id defaults
        // (m=19456 KiB, t=2, p=1)
        let salt = SaltString::generate(OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(&password_bytes, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Password hash in PHC string format (algorithm, parameters, salt, hash).
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., loaded from the database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash.
    ///
    /// The pepper must match the one used during hashing. Argon2 performs
    /// the digest comparison in constant time internally.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let password_bytes = match pepper {
            Some(p) => {
                let mut combined = password.as_bytes().to_vec();
                combined.extend_from_slice(p);
                combined
            }
            None => password.as_bytes().to_vec(),
        };

        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
