//! Audit Recording
//!
//! Thin facade over the audit repository. Trail writes are best-effort:
//! a failed append must never turn a successful reset into an error, so
//! failures are logged and swallowed here.

use std::sync::Arc;

use crate::domain::entity::AuditEvent;
use crate::domain::repository::AuditRepository;

pub struct Auditor<A: AuditRepository> {
    repo: Arc<A>,
}

impl<A: AuditRepository> Auditor<A> {
    pub fn new(repo: Arc<A>) -> Self {
        Self { repo }
    }

    /// Append an event, logging instead of failing when the trail is down.
    pub async fn record(&self, event: AuditEvent) {
        let event_type = event.event_type.clone();
        if let Err(e) = self.repo.append_audit(&event).await {
            tracing::warn!(error = %e, event_type = %event_type, "Failed to append audit event");
        }
    }
}
