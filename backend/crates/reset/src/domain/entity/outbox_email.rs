//! Outbox Email Entity
//!
//! Demo-mode capture of outgoing mail so the reset link can be inspected
//! without a real SMTP transport.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OutboxEmail {
    pub outbox_id: Uuid,
    pub to_address: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl OutboxEmail {
    pub fn new(to_address: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            outbox_id: Uuid::new_v4(),
            to_address: to_address.into(),
            subject: subject.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let email = OutboxEmail::new("user@example.com", "Reset your password", "body text");
        assert_eq!(email.to_address, "user@example.com");
        assert_eq!(email.subject, "Reset your password");
        assert_eq!(email.body, "body text");
    }
}
