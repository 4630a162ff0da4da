use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use murmur_auth_schema::{
    accounts, email_verification_codes, login_activities, mfa_configurations, password_reset_codes,
};

use crate::domain::repository::{
    AccountRepository, EmailCodeRepository, LoginActivityRepository, MfaRepository,
    PasswordResetRepository,
};
use crate::domain::types::{
    Account, EmailVerificationCode, LoginActivity, MfaConfig, PasswordResetCode,
};
use crate::error::AuthServiceError;

// ── Account repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthServiceError> {
        let model = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find account by id")?;
        Ok(model.map(account_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find account by email")?;
        Ok(model.map(account_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find account by username")?;
        Ok(model.map(account_from_model))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, AuthServiceError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::PhoneNumber.eq(phone))
            .one(&self.db)
            .await
            .context("find account by phone")?;
        Ok(model.map(account_from_model))
    }

    async fn insert(&self, account: &Account) -> Result<(), AuthServiceError> {
        accounts::ActiveModel {
            id: Set(account.id),
            email: Set(account.email.clone()),
            username: Set(account.username.clone()),
            phone_number: Set(account.phone_number.clone()),
            password_hash: Set(account.password_hash.clone()),
            name: Set(account.name.clone()),
            image_url: Set(account.image_url.clone()),
            email_verified: Set(account.email_verified),
            last_login: Set(account.last_login),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        }
        .insert(&self.db)
        .await
        .context("insert account")?;
        Ok(())
    }

    async fn set_email_verified(&self, id: Uuid) -> Result<(), AuthServiceError> {
        accounts::ActiveModel {
            id: Set(id),
            email_verified: Set(true),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set email verified")?;
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<(), AuthServiceError> {
        accounts::ActiveModel {
            id: Set(id),
            password_hash: Set(hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set password hash")?;
        Ok(())
    }

    async fn set_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AuthServiceError> {
        accounts::ActiveModel {
            id: Set(id),
            last_login: Set(Some(at)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set last login")?;
        Ok(())
    }
}

fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: model.id,
        email: model.email,
        username: model.username,
        phone_number: model.phone_number,
        password_hash: model.password_hash,
        name: model.name,
        image_url: model.image_url,
        email_verified: model.email_verified,
        last_login: model.last_login,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Email verification code repository ───────────────────────────────────────

#[derive(Clone)]
pub struct DbEmailCodeRepository {
    pub db: DatabaseConnection,
}

impl EmailCodeRepository for DbEmailCodeRepository {
    async fn find(
        &self,
        account_id: Uuid,
    ) -> Result<Option<EmailVerificationCode>, AuthServiceError> {
        let model = email_verification_codes::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .context("find email verification code")?;
        Ok(model.map(|m| EmailVerificationCode {
            account_id: m.account_id,
            code: m.code,
            created_at: m.created_at,
        }))
    }

    async fn upsert(&self, code: &EmailVerificationCode) -> Result<(), AuthServiceError> {
        let existing = email_verification_codes::Entity::find_by_id(code.account_id)
            .one(&self.db)
            .await
            .context("find email verification code for upsert")?;
        let active = email_verification_codes::ActiveModel {
            account_id: Set(code.account_id),
            code: Set(code.code.clone()),
            created_at: Set(code.created_at),
        };
        if existing.is_some() {
            active
                .update(&self.db)
                .await
                .context("replace email verification code")?;
        } else {
            active
                .insert(&self.db)
                .await
                .context("insert email verification code")?;
        }
        Ok(())
    }

    async fn delete(&self, account_id: Uuid) -> Result<(), AuthServiceError> {
        email_verification_codes::Entity::delete_by_id(account_id)
            .exec(&self.db)
            .await
            .context("delete email verification code")?;
        Ok(())
    }
}

// ── MFA repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMfaRepository {
    pub db: DatabaseConnection,
}

impl MfaRepository for DbMfaRepository {
    async fn find(&self, account_id: Uuid) -> Result<Option<MfaConfig>, AuthServiceError> {
        let model = mfa_configurations::Entity::find_by_id(account_id)
            .one(&self.db)
            .await
            .context("find mfa configuration")?;
        model.map(mfa_from_model).transpose()
    }

    async fn upsert(&self, config: &MfaConfig) -> Result<(), AuthServiceError> {
        let recovery_codes =
            serde_json::to_value(&config.recovery_codes).context("serialize recovery codes")?;
        let existing = mfa_configurations::Entity::find_by_id(config.account_id)
            .one(&self.db)
            .await
            .context("find mfa configuration for upsert")?;
        let active = mfa_configurations::ActiveModel {
            account_id: Set(config.account_id),
            activated: Set(config.activated),
            activated_at: Set(config.activated_at),
            secret: Set(config.secret.clone()),
            recovery_codes: Set(recovery_codes),
            updated_at: Set(config.updated_at),
        };
        if existing.is_some() {
            active
                .update(&self.db)
                .await
                .context("update mfa configuration")?;
        } else {
            active
                .insert(&self.db)
                .await
                .context("insert mfa configuration")?;
        }
        Ok(())
    }

    async fn secret_in_use(&self, secret: &str) -> Result<bool, AuthServiceError> {
        let model = mfa_configurations::Entity::find()
            .filter(mfa_configurations::Column::Secret.eq(secret))
            .one(&self.db)
            .await
            .context("check mfa secret uniqueness")?;
        Ok(model.is_some())
    }
}

fn mfa_from_model(model: mfa_configurations::Model) -> Result<MfaConfig, AuthServiceError> {
    let recovery_codes: Vec<String> =
        serde_json::from_value(model.recovery_codes).context("deserialize recovery codes")?;
    Ok(MfaConfig {
        account_id: model.account_id,
        activated: model.activated,
        activated_at: model.activated_at,
        secret: model.secret,
        recovery_codes,
        updated_at: model.updated_at,
    })
}

// ── Password reset repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPasswordResetRepository {
    pub db: DatabaseConnection,
}

impl PasswordResetRepository for DbPasswordResetRepository {
    async fn find(&self, email: &str) -> Result<Option<PasswordResetCode>, AuthServiceError> {
        let model = password_reset_codes::Entity::find_by_id(email.to_owned())
            .one(&self.db)
            .await
            .context("find password reset code")?;
        Ok(model.map(|m| PasswordResetCode {
            email: m.email,
            code: m.code,
            attempts: m.attempts,
            created_at: m.created_at,
        }))
    }

    async fn upsert(&self, code: &PasswordResetCode) -> Result<(), AuthServiceError> {
        let existing = password_reset_codes::Entity::find_by_id(code.email.clone())
            .one(&self.db)
            .await
            .context("find password reset code for upsert")?;
        let active = password_reset_codes::ActiveModel {
            email: Set(code.email.clone()),
            code: Set(code.code.clone()),
            attempts: Set(code.attempts),
            created_at: Set(code.created_at),
        };
        if existing.is_some() {
            active
                .update(&self.db)
                .await
                .context("replace password reset code")?;
        } else {
            active
                .insert(&self.db)
                .await
                .context("insert password reset code")?;
        }
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<(), AuthServiceError> {
        password_reset_codes::Entity::delete_by_id(email.to_owned())
            .exec(&self.db)
            .await
            .context("delete password reset code")?;
        Ok(())
    }
}

// ── Login activity repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLoginActivityRepository {
    pub db: DatabaseConnection,
}

impl LoginActivityRepository for DbLoginActivityRepository {
    async fn insert(&self, activity: &LoginActivity) -> Result<(), AuthServiceError> {
        login_activities::ActiveModel {
            id: Set(activity.id),
            account_id: Set(activity.account_id),
            ip: Set(activity.ip.clone()),
            user_agent: Set(activity.user_agent.clone()),
            created_at: Set(activity.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert login activity")?;
        Ok(())
    }

    async fn list_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<LoginActivity>, AuthServiceError> {
        let models = login_activities::Entity::find()
            .filter(login_activities::Column::AccountId.eq(account_id))
            .order_by_desc(login_activities::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list login activities")?;
        Ok(models
            .into_iter()
            .map(|m| LoginActivity {
                id: m.id,
                account_id: m.account_id,
                ip: m.ip,
                user_agent: m.user_agent,
                created_at: m.created_at,
            })
            .collect())
    }
}
