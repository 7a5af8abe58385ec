//! Runtime Configuration
//!
//! Immutable settings resolved once at startup. Mutable SMTP settings live
//! in [`crate::application::mailer`] instead, since they can be replaced at
//! runtime in demo mode.

use std::time::Duration;

use platform::rate_limit::RateLimitConfig;

/// Reset flow configuration.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    /// Demo mode exposes the outbox and the runtime SMTP endpoint
    pub demo_mode: bool,
    /// Create a sandbox account when an unknown identifier requests a reset
    pub allow_provisioning: bool,
    /// Public origin used to build reset links, no trailing slash
    pub base_url: String,
    /// Token lifetime from issuance to expiry
    pub token_ttl: Duration,
    /// Per-origin-IP request allowance
    pub ip_limit: RateLimitConfig,
    /// Per-identifier request allowance
    pub identifier_limit: RateLimitConfig,
    /// Optional server-side pepper mixed into credential hashing
    password_pepper: Option<Vec<u8>>,
}

impl ResetConfig {
    pub fn new(
        demo_mode: bool,
        allow_provisioning: bool,
        base_url: impl Into<String>,
        password_pepper: Option<Vec<u8>>,
    ) -> Self {
        Self {
            demo_mode,
            allow_provisioning,
            base_url: base_url.into(),
            token_ttl: Duration::from_secs(30 * 60),
            ip_limit: RateLimitConfig::new(25, 15 * 60),
            identifier_limit: RateLimitConfig::new(5, 15 * 60),
            password_pepper,
        }
    }

    /// Permissive defaults for local development and tests.
    pub fn development() -> Self {
        Self::new(true, true, "http://localhost:3001", None)
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Token TTL as a chrono duration for expiry arithmetic.
    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl).unwrap_or_else(|_| chrono::Duration::minutes(30))
    }
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResetConfig::development();
        assert!(config.demo_mode);
        assert!(config.allow_provisioning);
        assert_eq!(config.token_ttl, Duration::from_secs(1800));
        assert_eq!(config.ip_limit.max_requests, 25);
        assert_eq!(config.identifier_limit.max_requests, 5);
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_ttl_chrono() {
        let config = ResetConfig::development();
        assert_eq!(config.token_ttl_chrono(), chrono::Duration::minutes(30));
    }
}
