//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Account, AuditEvent, OutboxEmail, ResetRecord};
use crate::domain::repository::{
    AccountRepository, AuditRepository, OutboxRepository, RateLimitRepository,
    ResetRecordRepository,
};
use crate::domain::value_object::Identifier;
use crate::error::ResetResult;

/// PostgreSQL-backed repository for the whole reset flow
#[derive(Clone)]
pub struct PgResetRepository {
    pool: PgPool,
}

impl PgResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete expired, unredeemed records and stale rate limit windows
    pub async fn cleanup_expired(&self) -> ResetResult<u64> {
        let now = Utc::now();

        let deleted = sqlx::query(
            "DELETE FROM password_resets WHERE used_at IS NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM reset_rate_limits WHERE window_start_ms < $1")
            .bind(now.timestamp_millis() - 24 * 3600 * 1000)
            .execute(&self.pool)
            .await?;

        tracing::info!(resets_deleted = deleted, "Cleaned up expired reset records");

        Ok(deleted)
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgResetRepository {
    async fn find_enabled_by_email(
        &self,
        identifier: &Identifier,
    ) -> ResetResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                display_name,
                password_hash,
                disabled,
                created_at,
                updated_at
            FROM accounts
            WHERE email = $1 AND disabled = FALSE
            "#,
        )
        .bind(identifier.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccountRow::into_account))
    }

    async fn insert_if_absent(&self, account: &Account) -> ResetResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                display_name,
                password_hash,
                disabled,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(account.account_id)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .bind(account.disabled)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Reset Record Repository Implementation
// ============================================================================

impl ResetRecordRepository for PgResetRepository {
    async fn create(&self, record: &ResetRecord) -> ResetResult<()> {
        sqlx::query(
            r#"
            INSERT INTO password_resets (
                reset_id,
                account_id,
                token_hash,
                expires_at,
                used_at,
                request_ip,
                request_ua,
                created_at
            ) VALUES ($1, $2, $3, $4, NULL, $5, $6, $7)
            "#,
        )
        .bind(record.reset_id)
        .bind(record.account_id)
        .bind(&record.token_hash)
        .bind(record.expires_at)
        .bind(&record.request_ip)
        .bind(&record.request_ua)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_unused_by_hash(
        &self,
        token_hash: &str,
    ) -> ResetResult<Option<(ResetRecord, Account)>> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT
                pr.reset_id,
                pr.account_id,
                pr.token_hash,
                pr.expires_at,
                pr.used_at,
                pr.request_ip,
                pr.request_ua,
                pr.created_at,
                a.email AS account_email,
                a.display_name AS account_display_name,
                a.password_hash AS account_password_hash,
                a.disabled AS account_disabled,
                a.created_at AS account_created_at,
                a.updated_at AS account_updated_at
            FROM password_resets pr
            JOIN accounts a ON a.account_id = pr.account_id
            WHERE pr.token_hash = $1 AND pr.used_at IS NULL
            ORDER BY pr.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CandidateRow::into_pair))
    }

    async fn redeem(
        &self,
        reset_id: Uuid,
        account_id: Uuid,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> ResetResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Conditional update decides the winner when the same token is
        // redeemed concurrently
        let consumed = sqlx::query(
            "UPDATE password_resets SET used_at = $1 WHERE reset_id = $2 AND used_at IS NULL",
        )
        .bind(now)
        .bind(reset_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if consumed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE accounts SET password_hash = $1, updated_at = $2 WHERE account_id = $3",
        )
        .bind(new_password_hash)
        .bind(now)
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}

// ============================================================================
// Audit Repository Implementation
// ============================================================================

impl AuditRepository for PgResetRepository {
    async fn append_audit(&self, event: &AuditEvent) -> ResetResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                event_id,
                event_type,
                account_id,
                ip,
                user_agent,
                details,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.event_id)
        .bind(&event.event_type)
        .bind(event.account_id)
        .bind(&event.ip)
        .bind(&event.user_agent)
        .bind(&event.details)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_audit(&self, limit: i64) -> ResetResult<Vec<AuditEvent>> {
        let rows = sqlx::query_as::<_, AuditEventRow>(
            r#"
            SELECT
                event_id,
                event_type,
                account_id,
                ip,
                user_agent,
                details,
                created_at
            FROM audit_events
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AuditEventRow::into_event).collect())
    }
}

// ============================================================================
// Outbox Repository Implementation
// ============================================================================

impl OutboxRepository for PgResetRepository {
    async fn append_outbox(&self, email: &OutboxEmail) -> ResetResult<()> {
        sqlx::query(
            r#"
            INSERT INTO outbox_emails (
                outbox_id,
                to_address,
                subject,
                body,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(email.outbox_id)
        .bind(&email.to_address)
        .bind(&email.subject)
        .bind(&email.body)
        .bind(email.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_outbox(&self, limit: i64) -> ResetResult<Vec<OutboxEmail>> {
        let rows = sqlx::query_as::<_, OutboxRow>(
            r#"
            SELECT
                outbox_id,
                to_address,
                subject,
                body,
                created_at
            FROM outbox_emails
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OutboxRow::into_email).collect())
    }
}

// ============================================================================
// Rate Limit Repository Implementation
// ============================================================================

impl RateLimitRepository for PgResetRepository {
    async fn check_rate(&self, key: &str, max_requests: u32, window_ms: i64) -> ResetResult<bool> {
        let now_ms = Utc::now().timestamp_millis();
        let window_start_ms = (now_ms / window_ms) * window_ms;

        let count: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reset_rate_limits (rate_key, window_start_ms, request_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (rate_key, window_start_ms)
            DO UPDATE SET request_count = reset_rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(key)
        .bind(window_start_ms)
        .fetch_one(&self.pool)
        .await?;

        Ok(count <= max_requests as i32)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    disabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            account_id: self.account_id,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            disabled: self.disabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    reset_id: Uuid,
    account_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    request_ip: Option<String>,
    request_ua: Option<String>,
    created_at: DateTime<Utc>,
    account_email: String,
    account_display_name: String,
    account_password_hash: String,
    account_disabled: bool,
    account_created_at: DateTime<Utc>,
    account_updated_at: DateTime<Utc>,
}

impl CandidateRow {
    fn into_pair(self) -> (ResetRecord, Account) {
        let record = ResetRecord {
            reset_id: self.reset_id,
            account_id: self.account_id,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            used_at: self.used_at,
            request_ip: self.request_ip,
            request_ua: self.request_ua,
            created_at: self.created_at,
        };
        let account = Account {
            account_id: self.account_id,
            email: self.account_email,
            display_name: self.account_display_name,
            password_hash: self.account_password_hash,
            disabled: self.account_disabled,
            created_at: self.account_created_at,
            updated_at: self.account_updated_at,
        };
        (record, account)
    }
}

#[derive(sqlx::FromRow)]
struct AuditEventRow {
    event_id: Uuid,
    event_type: String,
    account_id: Option<Uuid>,
    ip: Option<String>,
    user_agent: Option<String>,
    details: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl AuditEventRow {
    fn into_event(self) -> AuditEvent {
        AuditEvent {
            event_id: self.event_id,
            event_type: self.event_type,
            account_id: self.account_id,
            ip: self.ip,
            user_agent: self.user_agent,
            details: self.details,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OutboxRow {
    outbox_id: Uuid,
    to_address: String,
    subject: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl OutboxRow {
    fn into_email(self) -> OutboxEmail {
        OutboxEmail {
            outbox_id: self.outbox_id,
            to_address: self.to_address,
            subject: self.subject,
            body: self.body,
            created_at: self.created_at,
        }
    }
}
