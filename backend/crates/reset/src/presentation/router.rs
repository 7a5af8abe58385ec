//! Reset Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::ResetConfig;
use crate::application::mailer::Mailer;
use crate::domain::repository::{
    AccountRepository, AuditRepository, OutboxRepository, RateLimitRepository,
    ResetRecordRepository,
};
use crate::infra::postgres::PgResetRepository;
use crate::presentation::handlers::{self, ResetAppState};

/// Create the reset router with PostgreSQL repository
pub fn reset_router(repo: PgResetRepository, config: ResetConfig, mailer: Mailer) -> Router {
    reset_router_generic(repo, config, mailer)
}

/// Create a generic reset router for any repository implementation
pub fn reset_router_generic<R>(repo: R, config: ResetConfig, mailer: Mailer) -> Router
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
    let state = ResetAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        mailer: Arc::new(mailer),
    };

    Router::new()
        .route("/reset/request", post(handlers::request_reset::<R>))
        .route("/reset/confirm", post(handlers::confirm_reset::<R>))
        .route("/config", get(handlers::get_config::<R>))
        .route("/config/smtp", post(handlers::update_smtp_config::<R>))
        .route("/outbox", get(handlers::list_outbox::<R>))
        .route("/audit", get(handlers::list_audit::<R>))
        .with_state(state)
}
