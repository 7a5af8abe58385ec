//! Confirm Reset Use Case
//!
//! Redeems a token and replaces the account credential. Every way a token
//! can be unusable collapses into the same opaque error; the audit trail
//! keeps the distinctions.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::application::audit::Auditor;
use crate::application::config::ResetConfig;
use crate::application::request_reset::truncate;
use crate::domain::entity::{AuditEvent, AuditKind};
use crate::domain::repository::{AuditRepository, ResetRecordRepository};
use crate::domain::value_object::TokenHash;
use crate::error::{ResetError, ResetResult};
use platform::client::RequestMeta;
use platform::password::ClearTextPassword;

/// Confirm reset input
pub struct ConfirmResetInput {
    pub token: String,
    pub new_password: String,
}

/// Confirm reset use case
pub struct ConfirmResetUseCase<R>
where
    R: ResetRecordRepository + AuditRepository,
{
    repo: Arc<R>,
    config: Arc<ResetConfig>,
    auditor: Auditor<R>,
}

impl<R> ConfirmResetUseCase<R>
where
    R: ResetRecordRepository + AuditRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<ResetConfig>) -> Self {
        let auditor = Auditor::new(Arc::clone(&repo));
        Self {
            repo,
            config,
            auditor,
        }
    }

    pub async fn execute(&self, input: ConfirmResetInput, meta: &RequestMeta) -> ResetResult<()> {
        let token = input.token.trim();
        if token.is_empty() || input.new_password.is_empty() {
            self.auditor
                .record(
                    AuditEvent::new(AuditKind::ConfirmRejected, meta)
                        .with_details(json!({ "reason": "missing_token_or_password" })),
                )
                .await;
            return Err(ResetError::MissingFields);
        }

        let new_password = match ClearTextPassword::new(input.new_password) {
            Ok(password) => password,
            Err(policy) => {
                self.auditor
                    .record(
                        AuditEvent::new(AuditKind::ConfirmRejected, meta)
                            .with_details(json!({ "reason": "password_policy" })),
                    )
                    .await;
                return Err(ResetError::WeakPassword(policy.to_string()));
            }
        };

        match self.redeem(token, &new_password, meta).await {
            Ok(()) => Ok(()),
            Err(e @ (ResetError::Database(_) | ResetError::Internal(_))) => {
                self.auditor
                    .record(
                        AuditEvent::new(AuditKind::ConfirmError, meta)
                            .with_details(json!({ "message": truncate(&e.to_string(), 300) })),
                    )
                    .await;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn redeem(
        &self,
        token: &str,
        new_password: &ClearTextPassword,
        meta: &RequestMeta,
    ) -> ResetResult<()> {
        let presented = TokenHash::of(token);

        let candidate = self.repo.find_unused_by_hash(presented.as_str()).await?;

        let (record, account) = match candidate {
            Some((record, account)) if !account.disabled => (record, account),
            _ => {
                self.auditor
                    .record(
                        AuditEvent::new(AuditKind::ConfirmInvalid, meta)
                            .with_details(json!({ "tokenHashPrefix": presented.audit_prefix() })),
                    )
                    .await;
                return Err(ResetError::InvalidOrExpired);
            }
        };

        // Lookup was by hash already; re-compare in constant time so an
        // index or collation quirk cannot hand back the wrong row
        let stored = TokenHash::from_stored(record.token_hash.clone());
        if !presented.ct_eq(&stored) {
            self.auditor
                .record(
                    AuditEvent::new(AuditKind::ConfirmInvalid, meta).with_details(json!({
                        "tokenHashPrefix": presented.audit_prefix(),
                        "mismatch": true,
                    })),
                )
                .await;
            return Err(ResetError::InvalidOrExpired);
        }

        let now = Utc::now();
        if record.is_expired(now) {
            self.auditor
                .record(
                    AuditEvent::new(AuditKind::ConfirmExpired, meta)
                        .with_account(record.account_id),
                )
                .await;
            return Err(ResetError::InvalidOrExpired);
        }

        let new_hash = new_password.hash(self.config.pepper())?;

        let consumed = self
            .repo
            .redeem(
                record.reset_id,
                account.account_id,
                new_hash.as_phc_string(),
                now,
            )
            .await?;

        if !consumed {
            // A concurrent redemption of the same token won the race
            self.auditor
                .record(
                    AuditEvent::new(AuditKind::ConfirmInvalid, meta)
                        .with_details(json!({ "tokenHashPrefix": presented.audit_prefix() })),
                )
                .await;
            return Err(ResetError::InvalidOrExpired);
        }

        self.auditor
            .record(AuditEvent::new(AuditKind::ConfirmSuccess, meta).with_account(account.account_id))
            .await;

        Ok(())
    }
}
