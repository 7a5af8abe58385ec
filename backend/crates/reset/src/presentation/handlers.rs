//! HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use std::net::SocketAddr;
use std::sync::Arc;

use platform::client::{RequestMeta, extract_request_meta};

use crate::application::config::ResetConfig;
use crate::application::mailer::{Mailer, SmtpSettings};
use crate::application::{
    ConfirmResetInput, ConfirmResetUseCase, RequestResetInput, RequestResetUseCase,
};
use crate::domain::entity::{AuditEvent, AuditKind};
use crate::domain::repository::{
    AccountRepository, AuditRepository, OutboxRepository, RateLimitRepository,
    ResetRecordRepository,
};
use crate::domain::value_object::Identifier;
use crate::error::{ResetError, ResetResult};
use crate::presentation::dto::{
    AuditEventResponse, ConfigResponse, ConfirmResetRequest, ConfirmResetResponse,
    GenericAckResponse, OutboxEmailResponse, RequestResetRequest, SmtpConfigRequest, SmtpInfo,
    SmtpUpdateResponse,
};

const OUTBOX_PAGE_SIZE: i64 = 25;
const AUDIT_PAGE_SIZE: i64 = 50;

/// Shared state for reset handlers
pub struct ResetAppState<R>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<ResetConfig>,
    pub mailer: Arc<Mailer>,
}

impl<R> Clone for ResetAppState<R>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            config: Arc::clone(&self.config),
            mailer: Arc::clone(&self.mailer),
        }
    }
}

// ============================================================================
// Request Reset
// ============================================================================

/// POST /api/reset/request
pub async fn request_reset<R>(
    State(state): State<ResetAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RequestResetRequest>,
) -> ResetResult<Json<GenericAckResponse>>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let meta = extract_request_meta(&headers, Some(addr.ip()));

    check_request_limits(&state, &meta, &req.identifier).await?;

    let use_case = RequestResetUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.mailer.clone(),
    );
    use_case
        .execute(
            RequestResetInput {
                identifier: req.identifier,
            },
            &meta,
        )
        .await;

    Ok(Json(GenericAckResponse {
        ok: true,
        message: "If an account exists, a password reset link has been sent.".to_string(),
        outbox_url: state.config.demo_mode.then(|| "/outbox.html".to_string()),
    }))
}

/// Both limiters run before any account lookup. The identifier limiter
/// keys on the normalized identifier and falls back to the IP key when the
/// request carries none, so blank requests cannot dodge it.
async fn check_request_limits<R>(
    state: &ResetAppState<R>,
    meta: &RequestMeta,
    raw_identifier: &str,
) -> ResetResult<()>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let ip_key = format!("ip:{}", meta.ip_string().unwrap_or_else(|| "unknown".to_string()));

    let ip_limit = &state.config.ip_limit;
    let allowed = state
        .repo
        .check_rate(&ip_key, ip_limit.max_requests, ip_limit.window_ms())
        .await?;
    if !allowed {
        return Err(ResetError::RateLimited);
    }

    let id_key = match Identifier::normalize(raw_identifier) {
        Some(identifier) => format!("id:{identifier}"),
        None => ip_key,
    };

    let id_limit = &state.config.identifier_limit;
    let allowed = state
        .repo
        .check_rate(&id_key, id_limit.max_requests, id_limit.window_ms())
        .await?;
    if !allowed {
        return Err(ResetError::RateLimited);
    }

    Ok(())
}

// ============================================================================
// Confirm Reset
// ============================================================================

/// POST /api/reset/confirm
pub async fn confirm_reset<R>(
    State(state): State<ResetAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<ConfirmResetRequest>,
) -> ResetResult<Json<ConfirmResetResponse>>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let meta = extract_request_meta(&headers, Some(addr.ip()));

    let use_case = ConfirmResetUseCase::new(state.repo.clone(), state.config.clone());
    use_case
        .execute(
            ConfirmResetInput {
                token: req.token,
                new_password: req.new_password,
            },
            &meta,
        )
        .await?;

    Ok(Json(ConfirmResetResponse { ok: true }))
}

// ============================================================================
// Config
// ============================================================================

/// GET /api/config
pub async fn get_config<R>(State(state): State<ResetAppState<R>>) -> Json<ConfigResponse>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let settings = state.mailer.settings();
    Json(ConfigResponse {
        demo_mode: state.config.demo_mode,
        allow_user_provisioning: state.config.demo_mode && state.config.allow_provisioning,
        smtp: SmtpInfo::from_settings(&settings),
    })
}

/// POST /api/config/smtp
///
/// Demo-only, loopback-only. Everyone else sees the same 404 an unknown
/// route would produce.
pub async fn update_smtp_config<R>(
    State(state): State<ResetAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SmtpConfigRequest>,
) -> ResetResult<Json<SmtpUpdateResponse>>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let meta = extract_request_meta(&headers, Some(addr.ip()));
    if !state.config.demo_mode || !meta.is_loopback() {
        return Err(ResetError::NotFound);
    }

    let host = req.host.trim().to_string();
    let port = req.port.unwrap_or(587);
    let from_address = req.from_address.trim().to_string();

    if req.enabled {
        if host.is_empty() {
            return Err(ResetError::Validation(
                "SMTP host is required when enabled.".to_string(),
            ));
        }
        if port == 0 {
            return Err(ResetError::Validation(
                "SMTP port must be a number between 1 and 65535.".to_string(),
            ));
        }
        if from_address.is_empty() {
            return Err(ResetError::Validation(
                "From address is required when enabled.".to_string(),
            ));
        }
    }

    let previous_from = state.mailer.settings().from_address;
    let settings = SmtpSettings {
        enabled: req.enabled,
        host: host.clone(),
        port,
        secure: req.secure,
        user: Some(req.user.trim().to_string()).filter(|s| !s.is_empty()),
        pass: Some(req.pass.clone()).filter(|s| !s.is_empty()),
        from_address: if from_address.is_empty() {
            previous_from
        } else {
            from_address.clone()
        },
    };
    state.mailer.replace(settings);

    let (verified, verify_error) = match state.mailer.verify_transport() {
        Ok(()) => (true, None),
        Err(e) => {
            let msg: String = e.to_string().chars().take(300).collect();
            (false, Some(msg))
        }
    };

    // Secrets are recorded as set/unset, never by value
    let event = AuditEvent::new(AuditKind::SmtpConfigUpdated, &meta).with_details(serde_json::json!({
        "enabled": req.enabled,
        "host": if host.is_empty() { "" } else { "[set]" },
        "port": port,
        "secure": req.secure,
        "user": if req.user.trim().is_empty() { "" } else { "[set]" },
        "fromAddress": if from_address.is_empty() { "" } else { "[set]" },
        "verified": verified,
        "verifyError": verify_error,
    }));
    if let Err(e) = state.repo.append_audit(&event).await {
        tracing::warn!(error = %e, "Failed to append audit event");
    }

    Ok(Json(SmtpUpdateResponse {
        ok: true,
        verified,
        verify_error,
    }))
}

// ============================================================================
// Demo Inspection
// ============================================================================

/// GET /api/outbox
pub async fn list_outbox<R>(
    State(state): State<ResetAppState<R>>,
) -> ResetResult<Json<Vec<OutboxEmailResponse>>>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    if !state.config.demo_mode {
        return Err(ResetError::NotFound);
    }

    let emails = state.repo.recent_outbox(OUTBOX_PAGE_SIZE).await?;
    Ok(Json(emails.into_iter().map(Into::into).collect()))
}

/// GET /api/audit
pub async fn list_audit<R>(
    State(state): State<ResetAppState<R>>,
) -> ResetResult<Json<Vec<AuditEventResponse>>>
where
    R: AccountRepository
        + ResetRecordRepository
        + OutboxRepository
        + AuditRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static,
{
    let events = state.repo.recent_audit(AUDIT_PAGE_SIZE).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}
