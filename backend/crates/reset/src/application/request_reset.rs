//! Request Reset Use Case
//!
//! Issues a single-use reset token and delivers it out of band. The
//! response is the same regardless of whether the identifier matched an
//! account, so callers learn nothing about which emails exist; the audit
//! trail records what actually happened.

use std::sync::Arc;

use serde_json::json;

use crate::application::audit::Auditor;
use crate::application::config::ResetConfig;
use crate::application::mailer::Mailer;
use crate::domain::entity::{Account, AuditEvent, AuditKind, OutboxEmail, ResetRecord};
use crate::domain::repository::{
    AccountRepository, AuditRepository, OutboxRepository, ResetRecordRepository,
};
use crate::domain::value_object::{Identifier, ResetToken};
use crate::error::ResetResult;
use platform::client::RequestMeta;
use platform::password::ClearTextPassword;

/// Request reset input
pub struct RequestResetInput {
    /// Raw identifier as submitted; normalized inside the use case
    pub identifier: String,
}

/// Request reset use case
pub struct RequestResetUseCase<R>
where
    R: AccountRepository + ResetRecordRepository + OutboxRepository + AuditRepository,
{
    repo: Arc<R>,
    config: Arc<ResetConfig>,
    mailer: Arc<Mailer>,
    auditor: Auditor<R>,
}

impl<R> RequestResetUseCase<R>
where
    R: AccountRepository + ResetRecordRepository + OutboxRepository + AuditRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ResetConfig>, mailer: Arc<Mailer>) -> Self {
        let auditor = Auditor::new(Arc::clone(&repo));
        Self {
            repo,
            config,
            mailer,
            auditor,
        }
    }

    /// Run the issuance flow. Never fails: every internal fault is audited
    /// and folded into the same acknowledgement the success path returns.
    pub async fn execute(&self, input: RequestResetInput, meta: &RequestMeta) {
        let Some(identifier) = Identifier::normalize(&input.identifier) else {
            self.auditor
                .record(
                    AuditEvent::new(AuditKind::RequestRejected, meta)
                        .with_details(json!({ "reason": "missing_identifier" })),
                )
                .await;
            return;
        };

        if let Err(e) = self.issue(&identifier, meta).await {
            tracing::error!(error = %e, "Reset issuance failed");
            self.auditor
                .record(
                    AuditEvent::new(AuditKind::RequestError, meta)
                        .with_details(json!({ "message": e.to_string() })),
                )
                .await;
        }
    }

    async fn issue(&self, identifier: &Identifier, meta: &RequestMeta) -> ResetResult<()> {
        let account = match self.repo.find_enabled_by_email(identifier).await? {
            Some(account) => account,
            None => {
                if self.config.demo_mode && self.config.allow_provisioning {
                    match self.provision(identifier, meta).await? {
                        Some(account) => account,
                        None => return Ok(()),
                    }
                } else {
                    self.auditor
                        .record(
                            AuditEvent::new(AuditKind::RequestUnknown, meta)
                                .with_details(json!({ "identifier": identifier.as_str() })),
                        )
                        .await;
                    return Ok(());
                }
            }
        };

        let token = ResetToken::generate();
        let record = ResetRecord::new(
            account.account_id,
            &token.hash(),
            self.config.token_ttl_chrono(),
            meta,
        );
        let expires_at = record.expires_at;
        self.repo.create(&record).await?;

        let reset_link = format!("{}/reset.html?token={}", self.config.base_url, token.expose());
        let subject = "Reset your password";
        let body = format!(
            "Hi {},\n\nWe received a request to reset your password.\n\n\
             Reset link (demo): {}\n\n\
             This link expires in 30 minutes.\n\
             If you did not request this, you can ignore this email.\n",
            account.display_name, reset_link,
        );

        if self.config.demo_mode {
            self.repo
                .append_outbox(&OutboxEmail::new(account.email.clone(), subject, &body))
                .await?;
        }

        let (smtp_sent, smtp_error) = match self.mailer.send(&account.email, subject, &body) {
            Ok(sent) => (sent, None),
            Err(e) => (false, Some(truncate(&e.to_string(), 300))),
        };

        self.auditor
            .record(
                AuditEvent::new(AuditKind::RequestCreated, meta)
                    .with_account(account.account_id)
                    .with_details(json!({
                        "expiresAt": expires_at.to_rfc3339(),
                        "smtpSent": smtp_sent,
                        "smtpError": smtp_error,
                    })),
            )
            .await;

        Ok(())
    }

    /// Create a sandbox account so the rest of the flow has a real target.
    /// The placeholder credential is random and discarded; only a reset can
    /// make the account usable.
    async fn provision(
        &self,
        identifier: &Identifier,
        meta: &RequestMeta,
    ) -> ResetResult<Option<Account>> {
        let placeholder = ClearTextPassword::generate();
        let password_hash = placeholder.hash(self.config.pepper())?;

        let account = Account::provisioned(identifier, password_hash.as_phc_string().to_string());
        self.repo.insert_if_absent(&account).await?;

        // Re-read in case a concurrent request provisioned the same email
        let account = self.repo.find_enabled_by_email(identifier).await?;
        let mut event = AuditEvent::new(AuditKind::RequestProvisioned, meta)
            .with_details(json!({ "identifier": identifier.as_str() }));
        if let Some(account) = &account {
            event = event.with_account(account.account_id);
        }
        self.auditor.record(event).await;
        Ok(account)
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
