//! Account Entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::Identifier;

/// Account entity.
///
/// The reset core never creates accounts except through sandbox
/// provisioning, and never mutates them except to replace the credential
/// on successful redemption.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: Uuid,
    /// Normalized identifier (unique, case-insensitive)
    pub email: String,
    /// Display label used in delivery payloads
    pub display_name: String,
    /// PHC-format Argon2id hash; the plaintext never exists here
    pub password_hash: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a sandbox-provisioned account with a throwaway credential.
    ///
    /// Exists purely so the issuing flow has a valid target in demo
    /// deployments; the generated credential is unusable by humans.
    pub fn provisioned(identifier: &Identifier, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            account_id: Uuid::new_v4(),
            email: identifier.as_str().to_string(),
            display_name: identifier.display_label(),
            password_hash,
            disabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}
