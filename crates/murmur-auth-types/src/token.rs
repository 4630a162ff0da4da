//! JWT validation for the tokens minted by the auth service.
//!
//! Claims are a snapshot of the account taken at issuance time; they are not
//! refreshed until the next issuance. Every token carries a `typ` claim so an
//! MFA-pending token can never pass for an access token.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is good for. Serialized into the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
    MfaPending,
}

/// User identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub account_id: Uuid,
    pub username: String,
    pub name: String,
    pub verified: bool,
    pub image: Option<String>,
    pub exp: u64,
}

/// Errors returned by token validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("wrong token type")]
    WrongUse,
}

/// JWT claims payload shared by token issuance (auth service) and validation.
///
/// `sub` is the account UUID. The user-facing claims (`username`, `name`,
/// `verified`, `image`) are copied from the account at mint time. `jti`
/// identifies the token for the refresh-token blacklist.
///
/// [`Deserialize`] is always available — all consumers validate tokens.
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature.
/// Only the auth service enables it because it is the sole token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct JwtClaims {
    /// Account ID (UUID string).
    pub sub: String,
    pub username: String,
    pub name: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub typ: TokenUse,
    /// Token ID, used for the refresh-token blacklist.
    pub jti: String,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s — tolerates clock skew between services.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate an access-token value (bearer header or cookie), returning the
/// parsed identity. Rejects refresh and MFA-pending tokens.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    if claims.typ != TokenUse::Access {
        return Err(AuthError::WrongUse);
    }
    let account_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        account_id,
        username: claims.username,
        name: claims.name,
        verified: claims.verified,
        image: claims.image,
        exp: claims.exp,
    })
}

// ── Feature-gated: auth service only ─────────────────────────────────────

/// Validate a token of an expected use and return raw JWT claims.
///
/// Used by the auth service for the refresh flow (expects [`TokenUse::Refresh`])
/// and the MFA login flow (expects [`TokenUse::MfaPending`]).
///
/// Requires the `USE_ONLY_IN_AUTH_SERVICE` feature. All other consumers use
/// [`validate_access_token`].
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn validate_token(token: &str, secret: &str, expected: TokenUse) -> Result<JwtClaims, AuthError> {
    let claims = decode_jwt(token, secret)?;
    if claims.typ != expected {
        return Err(AuthError::WrongUse);
    }
    Ok(claims)
}
