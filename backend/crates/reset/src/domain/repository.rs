//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{Account, AuditEvent, OutboxEmail, ResetRecord};
use crate::domain::value_object::Identifier;
use crate::error::ResetResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Find a non-disabled account by normalized email
    async fn find_enabled_by_email(&self, identifier: &Identifier)
    -> ResetResult<Option<Account>>;

    /// Insert an account unless one already exists for its email
    async fn insert_if_absent(&self, account: &Account) -> ResetResult<()>;
}

/// Reset record repository trait
#[trait_variant::make(ResetRecordRepository: Send)]
pub trait LocalResetRecordRepository {
    /// Persist a freshly issued record
    async fn create(&self, record: &ResetRecord) -> ResetResult<()>;

    /// Find the most recent unused record matching a token hash, joined
    /// with its account
    async fn find_unused_by_hash(
        &self,
        token_hash: &str,
    ) -> ResetResult<Option<(ResetRecord, Account)>>;

    /// Atomically consume a record and replace the account credential.
    ///
    /// Returns false when the record was already consumed by a concurrent
    /// redemption; in that case the credential is left untouched.
    async fn redeem(
        &self,
        reset_id: Uuid,
        account_id: Uuid,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> ResetResult<bool>;
}

/// Audit trail repository trait
#[trait_variant::make(AuditRepository: Send)]
pub trait LocalAuditRepository {
    /// Append an event to the trail
    async fn append_audit(&self, event: &AuditEvent) -> ResetResult<()>;

    /// Most recent events, newest first
    async fn recent_audit(&self, limit: i64) -> ResetResult<Vec<AuditEvent>>;
}

/// Demo outbox repository trait
#[trait_variant::make(OutboxRepository: Send)]
pub trait LocalOutboxRepository {
    /// Capture an outgoing email
    async fn append_outbox(&self, email: &OutboxEmail) -> ResetResult<()>;

    /// Most recent captured emails, newest first
    async fn recent_outbox(&self, limit: i64) -> ResetResult<Vec<OutboxEmail>>;
}

/// Fixed-window rate limit repository trait
#[trait_variant::make(RateLimitRepository: Send)]
pub trait LocalRateLimitRepository {
    /// Count a hit against a key and report whether it is still within
    /// the window's allowance
    async fn check_rate(&self, key: &str, max_requests: u32, window_ms: i64) -> ResetResult<bool>;
}
