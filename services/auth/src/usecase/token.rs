//! Token issuance, refresh and logout.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use murmur_auth_types::token::{JwtClaims, TokenUse, validate_token};

use crate::domain::repository::TokenBlacklist;
use crate::error::AuthServiceError;
use crate::usecase::claims::ClaimsSnapshot;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Mint a JWT of the given use. Claims are the snapshot frozen at issuance;
/// `jti` is a fresh UUID so each token is individually revocable.
pub fn issue_token(
    account_id: Uuid,
    snapshot: &ClaimsSnapshot,
    typ: TokenUse,
    ttl_secs: u64,
    secret: &str,
) -> Result<String, AuthServiceError> {
    let claims = JwtClaims {
        sub: account_id.to_string(),
        username: snapshot.username.clone(),
        name: snapshot.name.clone(),
        verified: snapshot.verified,
        image: snapshot.image.clone(),
        typ,
        jti: Uuid::new_v4().to_string(),
        exp: now_secs() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))
}

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn issue_token_pair(
    account_id: Uuid,
    snapshot: &ClaimsSnapshot,
    secret: &str,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
) -> Result<TokenPair, AuthServiceError> {
    Ok(TokenPair {
        access_token: issue_token(account_id, snapshot, TokenUse::Access, access_ttl_secs, secret)?,
        refresh_token: issue_token(
            account_id,
            snapshot,
            TokenUse::Refresh,
            refresh_ttl_secs,
            secret,
        )?,
    })
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<B: TokenBlacklist> {
    pub blacklist: B,
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl<B: TokenBlacklist> RefreshTokenUseCase<B> {
    /// Exchange a refresh token for a new pair. Claims are copied from the
    /// presented token without a database round trip, so a profile change
    /// only surfaces on the next credential login.
    pub async fn execute(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        let claims = validate_token(refresh_token, &self.jwt_secret, TokenUse::Refresh)
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        if self.blacklist.is_revoked(&claims.jti).await? {
            return Err(AuthServiceError::InvalidRefreshToken);
        }

        let account_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;
        let snapshot = ClaimsSnapshot {
            username: claims.username,
            name: claims.name,
            verified: claims.verified,
            image: claims.image,
        };

        issue_token_pair(
            account_id,
            &snapshot,
            &self.jwt_secret,
            self.access_ttl_secs,
            self.refresh_ttl_secs,
        )
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<B: TokenBlacklist> {
    pub blacklist: B,
    pub jwt_secret: String,
    pub blacklist_on_logout: bool,
}

impl<B: TokenBlacklist> LogoutUseCase<B> {
    /// Revoke the presented refresh token for the rest of its lifetime.
    /// A missing or unparseable token is not an error: logout always
    /// succeeds so the handler can clear cookies unconditionally.
    pub async fn execute(&self, refresh_token: Option<&str>) -> Result<(), AuthServiceError> {
        if !self.blacklist_on_logout {
            return Ok(());
        }
        let Some(token) = refresh_token else {
            return Ok(());
        };
        let Ok(claims) = validate_token(token, &self.jwt_secret, TokenUse::Refresh) else {
            return Ok(());
        };
        let remaining = claims.exp.saturating_sub(now_secs());
        if remaining > 0 {
            self.blacklist.revoke(&claims.jti, remaining).await?;
        }
        Ok(())
    }
}
