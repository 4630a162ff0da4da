use std::sync::Arc;

use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::config::AuthConfig;
use crate::infra::cache::RedisTokenBlacklist;
use crate::infra::db::{
    DbAccountRepository, DbEmailCodeRepository, DbLoginActivityRepository, DbMfaRepository,
    DbPasswordResetRepository,
};
use crate::infra::mailer::MailQueue;
use crate::usecase::claims::ClaimsStrategy;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub mailer: MailQueue,
    pub config: Arc<AuthConfig>,
    pub claims: Arc<dyn ClaimsStrategy>,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn email_code_repo(&self) -> DbEmailCodeRepository {
        DbEmailCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn mfa_repo(&self) -> DbMfaRepository {
        DbMfaRepository {
            db: self.db.clone(),
        }
    }

    pub fn password_reset_repo(&self) -> DbPasswordResetRepository {
        DbPasswordResetRepository {
            db: self.db.clone(),
        }
    }

    pub fn login_activity_repo(&self) -> DbLoginActivityRepository {
        DbLoginActivityRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_blacklist(&self) -> RedisTokenBlacklist {
        RedisTokenBlacklist {
            pool: self.redis.clone(),
        }
    }
}
