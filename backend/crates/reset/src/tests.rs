//! Unit tests for the reset crate

#[cfg(test)]
mod request_flow_tests {
    use std::sync::Arc;

    use crate::application::mailer::{Mailer, SmtpSettings};
    use crate::application::{RequestResetInput, RequestResetUseCase, ResetConfig};
    use crate::domain::entity::Account;
    use crate::domain::repository::{AccountRepository, OutboxRepository, ResetRecordRepository};
    use crate::domain::value_object::Identifier;
    use crate::infra::memory::MemoryResetRepository;
    use platform::client::RequestMeta;

    fn meta() -> RequestMeta {
        RequestMeta::new(Some("203.0.113.9".parse().unwrap()), Some("test-agent".into()))
    }

    fn seed(repo: &MemoryResetRepository, email: &str) -> Account {
        let identifier = Identifier::normalize(email).unwrap();
        let account = Account::provisioned(&identifier, "$argon2id$placeholder".to_string());
        repo.seed_account(account.clone());
        account
    }

    fn use_case(
        repo: &MemoryResetRepository,
        config: ResetConfig,
    ) -> RequestResetUseCase<MemoryResetRepository> {
        RequestResetUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(config),
            Arc::new(Mailer::log_only(SmtpSettings::default())),
        )
    }

    #[tokio::test]
    async fn test_existing_account_gets_record_and_outbox_email() {
        let repo = MemoryResetRepository::new();
        let account = seed(&repo, "alice@example.com");

        let uc = use_case(&repo, ResetConfig::development());
        uc.execute(
            RequestResetInput {
                identifier: "Alice@Example.COM ".to_string(),
            },
            &meta(),
        )
        .await;

        assert_eq!(repo.reset_count(), 1);

        let emails = repo.recent_outbox(10).await.unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to_address, account.email);
        assert_eq!(emails[0].subject, "Reset your password");
        assert!(emails[0].body.contains("/reset.html?token="));
        assert!(emails[0].body.contains("expires in 30 minutes"));

        let types = repo.audit_types();
        assert!(types.contains(&"reset.request.created".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_identifier_without_provisioning() {
        let repo = MemoryResetRepository::new();
        let config = ResetConfig::new(true, false, "http://localhost:3001", None);

        let uc = use_case(&repo, config);
        uc.execute(
            RequestResetInput {
                identifier: "nobody@example.com".to_string(),
            },
            &meta(),
        )
        .await;

        assert_eq!(repo.reset_count(), 0);
        assert!(repo.recent_outbox(10).await.unwrap().is_empty());
        assert_eq!(repo.audit_types(), vec!["reset.request.unknown".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_identifier_provisions_sandbox_account() {
        let repo = MemoryResetRepository::new();

        let uc = use_case(&repo, ResetConfig::development());
        uc.execute(
            RequestResetInput {
                identifier: "fresh@example.com".to_string(),
            },
            &meta(),
        )
        .await;

        let identifier = Identifier::normalize("fresh@example.com").unwrap();
        let account = repo
            .find_enabled_by_email(&identifier)
            .await
            .unwrap()
            .expect("sandbox account should exist");
        assert_eq!(account.display_name, "fresh");
        assert_eq!(repo.reset_count(), 1);

        let types = repo.audit_types();
        assert!(types.contains(&"reset.request.provisioned".to_string()));
        assert!(types.contains(&"reset.request.created".to_string()));
    }

    #[tokio::test]
    async fn test_provisioning_disabled_outside_demo_mode() {
        let repo = MemoryResetRepository::new();
        let config = ResetConfig::new(false, true, "http://localhost:3001", None);

        let uc = use_case(&repo, config);
        uc.execute(
            RequestResetInput {
                identifier: "fresh@example.com".to_string(),
            },
            &meta(),
        )
        .await;

        assert_eq!(repo.reset_count(), 0);
        assert_eq!(repo.audit_types(), vec!["reset.request.unknown".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_identifier_rejected_before_lookup() {
        let repo = MemoryResetRepository::new();

        let uc = use_case(&repo, ResetConfig::development());
        uc.execute(
            RequestResetInput {
                identifier: "   ".to_string(),
            },
            &meta(),
        )
        .await;

        assert_eq!(repo.reset_count(), 0);
        assert_eq!(repo.audit_types(), vec!["reset.request.rejected".to_string()]);

        let event = repo.last_audit().unwrap();
        assert_eq!(event.details.unwrap()["reason"], "missing_identifier");
    }

    #[tokio::test]
    async fn test_outbox_skipped_outside_demo_mode() {
        let repo = MemoryResetRepository::new();
        seed(&repo, "alice@example.com");
        let config = ResetConfig::new(false, false, "https://accounts.example.com", None);

        let uc = use_case(&repo, config);
        uc.execute(
            RequestResetInput {
                identifier: "alice@example.com".to_string(),
            },
            &meta(),
        )
        .await;

        assert_eq!(repo.reset_count(), 1);
        assert!(repo.recent_outbox(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_token_never_stored_in_cleartext() {
        let repo = MemoryResetRepository::new();
        seed(&repo, "alice@example.com");

        let uc = use_case(&repo, ResetConfig::development());
        uc.execute(
            RequestResetInput {
                identifier: "alice@example.com".to_string(),
            },
            &meta(),
        )
        .await;

        let emails = repo.recent_outbox(10).await.unwrap();
        let token = super::support::token_from_body(&emails[0].body);

        let hash = crate::domain::value_object::TokenHash::of(&token);
        let found = repo.find_unused_by_hash(hash.as_str()).await.unwrap();
        let (record, _) = found.expect("record stored under the hash");
        assert_ne!(record.token_hash, token);
        assert_eq!(record.token_hash.len(), 64);
    }
}

#[cfg(test)]
mod confirm_flow_tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use crate::application::mailer::{Mailer, SmtpSettings};
    use crate::application::{
        ConfirmResetInput, ConfirmResetUseCase, RequestResetInput, RequestResetUseCase,
        ResetConfig,
    };
    use crate::domain::entity::{Account, ResetRecord};
    use crate::domain::repository::OutboxRepository;
    use crate::domain::value_object::{Identifier, ResetToken};
    use crate::error::ResetError;
    use crate::infra::memory::MemoryResetRepository;
    use platform::client::RequestMeta;
    use platform::password::{ClearTextPassword, HashedPassword};

    const STRONG_PASSWORD: &str = "Br&nd-new Passw0rd!";

    fn meta() -> RequestMeta {
        RequestMeta::new(Some("203.0.113.9".parse().unwrap()), Some("test-agent".into()))
    }

    fn confirm_uc(repo: &MemoryResetRepository) -> ConfirmResetUseCase<MemoryResetRepository> {
        ConfirmResetUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ResetConfig::development()),
        )
    }

    /// Issue a token for an email and return (account, plaintext token)
    async fn issue(repo: &MemoryResetRepository, email: &str) -> (Account, String) {
        let identifier = Identifier::normalize(email).unwrap();
        let account = Account::provisioned(&identifier, "$argon2id$placeholder".to_string());
        repo.seed_account(account.clone());

        let uc = RequestResetUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ResetConfig::development()),
            Arc::new(Mailer::log_only(SmtpSettings::default())),
        );
        uc.execute(
            RequestResetInput {
                identifier: email.to_string(),
            },
            &meta(),
        )
        .await;

        let emails = repo.recent_outbox(1).await.unwrap();
        let token = super::support::token_from_body(&emails[0].body);
        (account, token)
    }

    #[tokio::test]
    async fn test_happy_path_replaces_credential() {
        let repo = MemoryResetRepository::new();
        let (account, token) = issue(&repo, "alice@example.com").await;

        confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token,
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await
            .expect("redemption should succeed");

        let updated = repo.account(account.account_id).unwrap();
        assert_ne!(updated.password_hash, account.password_hash);

        let hashed = HashedPassword::from_phc_string(updated.password_hash).unwrap();
        let password = ClearTextPassword::new(STRONG_PASSWORD.to_string()).unwrap();
        assert!(hashed.verify(&password, None));

        assert!(
            repo.audit_types()
                .contains(&"reset.confirm.success".to_string())
        );
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let repo = MemoryResetRepository::new();
        let (_, token) = issue(&repo, "alice@example.com").await;

        confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: token.clone(),
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await
            .unwrap();

        let second = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token,
                    new_password: "An0ther str0ng-P@ss!".to_string(),
                },
                &meta(),
            )
            .await;
        assert!(matches!(second, Err(ResetError::InvalidOrExpired)));
    }

    #[tokio::test]
    async fn test_unknown_token_rejected_with_prefix_audit() {
        let repo = MemoryResetRepository::new();

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: "definitely-not-issued".to_string(),
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await;
        assert!(matches!(result, Err(ResetError::InvalidOrExpired)));

        let event = repo.last_audit().unwrap();
        assert_eq!(event.event_type, "reset.confirm.invalid");
        let prefix = event.details.unwrap()["tokenHashPrefix"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(prefix.len(), 8);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let repo = MemoryResetRepository::new();
        let identifier = Identifier::normalize("alice@example.com").unwrap();
        let account = Account::provisioned(&identifier, "$argon2id$placeholder".to_string());
        repo.seed_account(account.clone());

        let token = ResetToken::generate();
        let mut record = ResetRecord::new(
            account.account_id,
            &token.hash(),
            Duration::minutes(30),
            &meta(),
        );
        record.expires_at = Utc::now() - Duration::seconds(1);
        repo.seed_reset(record);

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: token.expose().to_string(),
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await;
        assert!(matches!(result, Err(ResetError::InvalidOrExpired)));
        assert!(
            repo.audit_types()
                .contains(&"reset.confirm.expired".to_string())
        );

        // The credential is untouched
        let unchanged = repo.account(account.account_id).unwrap();
        assert_eq!(unchanged.password_hash, account.password_hash);
    }

    #[tokio::test]
    async fn test_disabled_account_cannot_redeem() {
        let repo = MemoryResetRepository::new();
        let identifier = Identifier::normalize("alice@example.com").unwrap();
        let mut account = Account::provisioned(&identifier, "$argon2id$placeholder".to_string());
        account.disabled = true;
        repo.seed_account(account.clone());

        let token = ResetToken::generate();
        let record = ResetRecord::new(
            account.account_id,
            &token.hash(),
            Duration::minutes(30),
            &meta(),
        );
        repo.seed_reset(record);

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: token.expose().to_string(),
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await;
        assert!(matches!(result, Err(ResetError::InvalidOrExpired)));
    }

    #[tokio::test]
    async fn test_sibling_tokens_stay_valid() {
        let repo = MemoryResetRepository::new();
        let (_, older) = issue(&repo, "alice@example.com").await;

        // A second request does not invalidate the first token
        let uc = RequestResetUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(ResetConfig::development()),
            Arc::new(Mailer::log_only(SmtpSettings::default())),
        );
        uc.execute(
            RequestResetInput {
                identifier: "alice@example.com".to_string(),
            },
            &meta(),
        )
        .await;
        assert_eq!(repo.reset_count(), 2);

        confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: older,
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await
            .expect("older sibling should still redeem");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let repo = MemoryResetRepository::new();

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: "   ".to_string(),
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await;
        assert!(matches!(result, Err(ResetError::MissingFields)));

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: "sometoken".to_string(),
                    new_password: String::new(),
                },
                &meta(),
            )
            .await;
        assert!(matches!(result, Err(ResetError::MissingFields)));

        let event = repo.last_audit().unwrap();
        assert_eq!(event.event_type, "reset.confirm.rejected");
        assert_eq!(event.details.unwrap()["reason"], "missing_token_or_password");
    }

    #[tokio::test]
    async fn test_weak_password_rejected_with_rule_message() {
        let repo = MemoryResetRepository::new();
        let (_, token) = issue(&repo, "alice@example.com").await;

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: token.clone(),
                    new_password: "short".to_string(),
                },
                &meta(),
            )
            .await;
        match result {
            Err(ResetError::WeakPassword(msg)) => {
                assert_eq!(msg, "Password must be at least 14 characters.");
            }
            other => panic!("expected WeakPassword, got {other:?}"),
        }

        let result = confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token: token.clone(),
                    new_password: "no uppercase passw0rd!".to_string(),
                },
                &meta(),
            )
            .await;
        match result {
            Err(ResetError::WeakPassword(msg)) => {
                assert_eq!(msg, "Password must include an uppercase letter.");
            }
            other => panic!("expected WeakPassword, got {other:?}"),
        }

        // Failed attempts never consume the token
        confirm_uc(&repo)
            .execute(
                ConfirmResetInput {
                    token,
                    new_password: STRONG_PASSWORD.to_string(),
                },
                &meta(),
            )
            .await
            .expect("token should survive policy failures");
    }

    #[tokio::test]
    async fn test_concurrent_redemption_single_winner() {
        let repo = MemoryResetRepository::new();
        let (_, token) = issue(&repo, "alice@example.com").await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                let uc = ConfirmResetUseCase::new(
                    Arc::new(repo),
                    Arc::new(ResetConfig::development()),
                );
                uc.execute(
                    ConfirmResetInput {
                        token,
                        new_password: format!("Racing-Passw0rd! #{i}"),
                    },
                    &meta(),
                )
                .await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use crate::domain::repository::RateLimitRepository;
    use crate::infra::memory::MemoryResetRepository;

    #[tokio::test]
    async fn test_window_allowance() {
        let repo = MemoryResetRepository::new();
        let window_ms = 15 * 60 * 1000;

        for _ in 0..5 {
            assert!(repo.check_rate("id:alice@example.com", 5, window_ms).await.unwrap());
        }
        assert!(!repo.check_rate("id:alice@example.com", 5, window_ms).await.unwrap());

        // Other keys are unaffected
        assert!(repo.check_rate("id:bob@example.com", 5, window_ms).await.unwrap());
        assert!(repo.check_rate("ip:203.0.113.9", 25, window_ms).await.unwrap());
    }
}

#[cfg(test)]
mod error_mapping_tests {
    use axum::http::StatusCode;

    use crate::error::ResetError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ResetError::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ResetError::WeakPassword("reason".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResetError::InvalidOrExpired.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResetError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ResetError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ResetError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_faults_render_generic_message() {
        let err = ResetError::Internal("connection refused at 10.0.0.5".into());
        assert_eq!(err.public_message(), "Something went wrong.");

        let err = ResetError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.public_message(), "Something went wrong.");
    }

    #[test]
    fn test_safe_reasons_pass_through() {
        assert_eq!(
            ResetError::InvalidOrExpired.public_message(),
            "Invalid or expired reset token."
        );
        assert_eq!(
            ResetError::MissingFields.public_message(),
            "Token and newPassword are required."
        );
        assert_eq!(
            ResetError::WeakPassword("Password is too common.".into()).public_message(),
            "Password is too common."
        );
    }
}

#[cfg(test)]
mod support {
    /// Pull the plaintext token out of a delivered email body
    pub fn token_from_body(body: &str) -> String {
        let start = body.find("token=").expect("body should contain a reset link") + "token=".len();
        body[start..]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect()
    }
}
