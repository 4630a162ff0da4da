//! Persistence ports. Use cases are generic over these traits; `infra`
//! provides the sea-orm and Redis implementations, and the integration
//! tests provide in-memory mocks.

#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    Account, EmailVerificationCode, LoginActivity, MfaConfig, OutboundEmail, PasswordResetCode,
};
use crate::error::AuthServiceError;

/// Account rows. Every mutator bumps `updated_at`.
pub trait AccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthServiceError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, AuthServiceError>;
    async fn insert(&self, account: &Account) -> Result<(), AuthServiceError>;
    async fn set_email_verified(&self, id: Uuid) -> Result<(), AuthServiceError>;
    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<(), AuthServiceError>;
    async fn set_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError>;
}

pub trait EmailCodeRepository {
    async fn find(&self, account_id: Uuid)
    -> Result<Option<EmailVerificationCode>, AuthServiceError>;
    /// Insert or replace; at most one live code per account.
    async fn upsert(&self, code: &EmailVerificationCode) -> Result<(), AuthServiceError>;
    async fn delete(&self, account_id: Uuid) -> Result<(), AuthServiceError>;
}

pub trait MfaRepository {
    async fn find(&self, account_id: Uuid) -> Result<Option<MfaConfig>, AuthServiceError>;
    async fn upsert(&self, config: &MfaConfig) -> Result<(), AuthServiceError>;
    /// Checks whether any account already holds this TOTP secret.
    async fn secret_in_use(&self, secret: &str) -> Result<bool, AuthServiceError>;
}

pub trait PasswordResetRepository {
    async fn find(&self, email: &str) -> Result<Option<PasswordResetCode>, AuthServiceError>;
    async fn upsert(&self, code: &PasswordResetCode) -> Result<(), AuthServiceError>;
    async fn delete(&self, email: &str) -> Result<(), AuthServiceError>;
}

pub trait LoginActivityRepository {
    async fn insert(&self, activity: &LoginActivity) -> Result<(), AuthServiceError>;
    async fn list_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<LoginActivity>, AuthServiceError>;
}

/// Revoked-refresh-token store. Entries expire with the token itself.
pub trait TokenBlacklist {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), AuthServiceError>;
    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthServiceError>;
}

/// Hand-off point to the mail queue. Enqueueing never blocks a request on
/// SMTP; delivery failures are the worker's problem.
pub trait MailerPort {
    async fn enqueue(&self, email: OutboundEmail) -> Result<(), AuthServiceError>;
}
