use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::TokenBlacklist;
use crate::error::AuthServiceError;

/// Redis-backed refresh-token blacklist. Keys carry a TTL equal to the
/// token's remaining lifetime, so entries vanish as their tokens expire.
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    pub pool: Pool,
}

fn blacklist_key(jti: &str) -> String {
    format!("token_blacklist:{jti}")
}

impl TokenBlacklist for RedisTokenBlacklist {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(blacklist_key(jti), 1u8, ttl_secs)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let revoked: bool = conn
            .exists(blacklist_key(jti))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;
        Ok(revoked)
    }
}
