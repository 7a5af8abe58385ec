//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::{AuditEvent, OutboxEmail};
use crate::application::mailer::SmtpSettings;

// ============================================================================
// Request Reset
// ============================================================================

/// Reset request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResetRequest {
    #[serde(default)]
    pub identifier: String,
}

/// Generic acknowledgement; identical for every request outcome
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericAckResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbox_url: Option<String>,
}

// ============================================================================
// Confirm Reset
// ============================================================================

/// Reset confirmation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResetRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Reset confirmation response
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResetResponse {
    pub ok: bool,
}

// ============================================================================
// Config
// ============================================================================

/// Public runtime configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub demo_mode: bool,
    pub allow_user_provisioning: bool,
    pub smtp: SmtpInfo,
}

/// SMTP settings as shown to clients; the password is never echoed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpInfo {
    pub enabled: bool,
    pub configured: bool,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: String,
    pub from_address: String,
}

impl SmtpInfo {
    pub fn from_settings(settings: &SmtpSettings) -> Self {
        Self {
            enabled: settings.enabled,
            configured: settings.is_configured(),
            host: settings.host.clone(),
            port: settings.port,
            secure: settings.secure,
            user: settings.user.clone().unwrap_or_default(),
            from_address: settings.from_address.clone(),
        }
    }
}

/// Runtime SMTP update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpConfigRequest {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub host: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub from_address: String,
}

/// Runtime SMTP update response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpUpdateResponse {
    pub ok: bool,
    pub verified: bool,
    pub verify_error: Option<String>,
}

// ============================================================================
// Demo Inspection
// ============================================================================

/// Captured outbox email
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEmailResponse {
    pub id: Uuid,
    pub to_address: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<OutboxEmail> for OutboxEmailResponse {
    fn from(email: OutboxEmail) -> Self {
        Self {
            id: email.outbox_id,
            to_address: email.to_address,
            subject: email.subject,
            body: email.body,
            created_at: email.created_at,
        }
    }
}

/// Audit trail entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: String,
    pub account_id: Option<Uuid>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditEvent> for AuditEventResponse {
    fn from(event: AuditEvent) -> Self {
        Self {
            id: event.event_id,
            event_type: event.event_type,
            account_id: event.account_id,
            ip: event.ip,
            user_agent: event.user_agent,
            details: event.details,
            created_at: event.created_at,
        }
    }
}
