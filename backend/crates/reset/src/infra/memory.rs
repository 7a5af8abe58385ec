//! In-Memory Repository Implementation
//!
//! Single-process implementation backed by one mutex, used by the test
//! suite and quick local runs without Postgres. One lock covers all state,
//! so redemption gets the same winner-takes-all behavior the database
//! version gets from its conditional update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{Account, AuditEvent, OutboxEmail, ResetRecord};
use crate::domain::repository::{
    AccountRepository, AuditRepository, OutboxRepository, RateLimitRepository,
    ResetRecordRepository,
};
use crate::domain::value_object::Identifier;
use crate::error::ResetResult;

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    resets: HashMap<Uuid, ResetRecord>,
    outbox: Vec<OutboxEmail>,
    audits: Vec<AuditEvent>,
    rate: HashMap<(String, i64), u32>,
}

/// Mutex-backed repository for tests and local development
#[derive(Clone, Default)]
pub struct MemoryResetRepository {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryResetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert an account directly, bypassing the uniqueness check.
    pub fn seed_account(&self, account: Account) {
        self.lock().accounts.insert(account.account_id, account);
    }

    /// Insert a reset record directly, e.g. one already expired.
    pub fn seed_reset(&self, record: ResetRecord) {
        self.lock().resets.insert(record.reset_id, record);
    }

    pub fn account(&self, account_id: Uuid) -> Option<Account> {
        self.lock().accounts.get(&account_id).cloned()
    }

    pub fn reset_count(&self) -> usize {
        self.lock().resets.len()
    }

    pub fn audit_types(&self) -> Vec<String> {
        self.lock()
            .audits
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub fn last_audit(&self) -> Option<AuditEvent> {
        self.lock().audits.last().cloned()
    }
}

impl AccountRepository for MemoryResetRepository {
    async fn find_enabled_by_email(
        &self,
        identifier: &Identifier,
    ) -> ResetResult<Option<Account>> {
        let state = self.lock();
        Ok(state
            .accounts
            .values()
            .find(|a| a.email == identifier.as_str() && !a.disabled)
            .cloned())
    }

    async fn insert_if_absent(&self, account: &Account) -> ResetResult<()> {
        let mut state = self.lock();
        let exists = state.accounts.values().any(|a| a.email == account.email);
        if !exists {
            state.accounts.insert(account.account_id, account.clone());
        }
        Ok(())
    }
}

impl ResetRecordRepository for MemoryResetRepository {
    async fn create(&self, record: &ResetRecord) -> ResetResult<()> {
        self.lock().resets.insert(record.reset_id, record.clone());
        Ok(())
    }

    async fn find_unused_by_hash(
        &self,
        token_hash: &str,
    ) -> ResetResult<Option<(ResetRecord, Account)>> {
        let state = self.lock();
        let record = state
            .resets
            .values()
            .filter(|r| r.token_hash == token_hash && r.used_at.is_none())
            .max_by_key(|r| r.created_at)
            .cloned();

        Ok(record.and_then(|record| {
            let account = state.accounts.get(&record.account_id).cloned()?;
            Some((record, account))
        }))
    }

    async fn redeem(
        &self,
        reset_id: Uuid,
        account_id: Uuid,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> ResetResult<bool> {
        let mut state = self.lock();

        let consumed = match state.resets.get_mut(&reset_id) {
            Some(record) if record.used_at.is_none() => {
                record.used_at = Some(now);
                true
            }
            _ => false,
        };
        if !consumed {
            return Ok(false);
        }

        if let Some(account) = state.accounts.get_mut(&account_id) {
            account.password_hash = new_password_hash.to_string();
            account.updated_at = now;
        }

        Ok(true)
    }
}

impl AuditRepository for MemoryResetRepository {
    async fn append_audit(&self, event: &AuditEvent) -> ResetResult<()> {
        self.lock().audits.push(event.clone());
        Ok(())
    }

    async fn recent_audit(&self, limit: i64) -> ResetResult<Vec<AuditEvent>> {
        let state = self.lock();
        Ok(state
            .audits
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

impl OutboxRepository for MemoryResetRepository {
    async fn append_outbox(&self, email: &OutboxEmail) -> ResetResult<()> {
        self.lock().outbox.push(email.clone());
        Ok(())
    }

    async fn recent_outbox(&self, limit: i64) -> ResetResult<Vec<OutboxEmail>> {
        let state = self.lock();
        Ok(state
            .outbox
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

impl RateLimitRepository for MemoryResetRepository {
    async fn check_rate(&self, key: &str, max_requests: u32, window_ms: i64) -> ResetResult<bool> {
        let now_ms = Utc::now().timestamp_millis();
        let window_start_ms = (now_ms / window_ms) * window_ms;

        let mut state = self.lock();
        let count = state
            .rate
            .entry((key.to_string(), window_start_ms))
            .and_modify(|c| *c += 1)
            .or_insert(1);

        Ok(*count <= max_requests)
    }
}
