//! Audit Event Entity
//!
//! Append-only record of every lifecycle transition attempt. The audit
//! trail is the only place the true cause of a collapsed outcome is ever
//! recorded; it must never contain plaintext tokens or passwords.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use platform::client::RequestMeta;

/// Audit event type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    /// Reset request dropped before issuance (e.g. missing identifier)
    RequestRejected,
    /// Identifier matched no enabled account, provisioning off
    RequestUnknown,
    /// Sandbox account created so the flow has a target
    RequestProvisioned,
    /// Token minted, record persisted, delivery attempted
    RequestCreated,
    /// Issuance failed internally (still acknowledged generically)
    RequestError,
    /// Redemption rejected before lookup (validation/policy)
    ConfirmRejected,
    /// No usable record for the presented token, or hash mismatch
    ConfirmInvalid,
    /// Record matched but past its expiry instant
    ConfirmExpired,
    /// Credential replaced, record consumed
    ConfirmSuccess,
    /// Redemption failed on an unexpected fault
    ConfirmError,
    /// Runtime SMTP settings replaced by an admin
    SmtpConfigUpdated,
}

impl AuditKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditKind::RequestRejected => "reset.request.rejected",
            AuditKind::RequestUnknown => "reset.request.unknown",
            AuditKind::RequestProvisioned => "reset.request.provisioned",
            AuditKind::RequestCreated => "reset.request.created",
            AuditKind::RequestError => "reset.request.error",
            AuditKind::ConfirmRejected => "reset.confirm.rejected",
            AuditKind::ConfirmInvalid => "reset.confirm.invalid",
            AuditKind::ConfirmExpired => "reset.confirm.expired",
            AuditKind::ConfirmSuccess => "reset.confirm.success",
            AuditKind::ConfirmError => "reset.confirm.error",
            AuditKind::SmtpConfigUpdated => "config.smtp.updated",
        }
    }
}

/// One append-only audit row.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub account_id: Option<Uuid>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// Structured detail payload; free-form but never secret-bearing
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(kind: AuditKind, meta: &RequestMeta) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: kind.as_str().to_string(),
            account_id: None,
            ip: meta.ip_string(),
            user_agent: meta.user_agent.clone(),
            details: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tags() {
        assert_eq!(AuditKind::RequestCreated.as_str(), "reset.request.created");
        assert_eq!(AuditKind::ConfirmInvalid.as_str(), "reset.confirm.invalid");
        assert_eq!(AuditKind::SmtpConfigUpdated.as_str(), "config.smtp.updated");
    }

    #[test]
    fn test_builder() {
        let meta = RequestMeta::new(Some("10.1.2.3".parse().unwrap()), Some("ua".into()));
        let account_id = Uuid::new_v4();
        let event = AuditEvent::new(AuditKind::ConfirmSuccess, &meta)
            .with_account(account_id)
            .with_details(json!({"reason": "test"}));

        assert_eq!(event.event_type, "reset.confirm.success");
        assert_eq!(event.account_id, Some(account_id));
        assert_eq!(event.ip.as_deref(), Some("10.1.2.3"));
        assert_eq!(event.details.unwrap()["reason"], "test");
    }
}
