//! Pluggable claim shaping for issued tokens.
//!
//! The strategy decides which account fields get copied into JWT claims at
//! mint time. It is resolved by name from `CLAIMS_STRATEGY` once at startup;
//! requests never consult configuration to pick one.

use std::sync::Arc;

use crate::domain::types::Account;

/// Account fields copied into a token at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsSnapshot {
    pub username: String,
    pub name: String,
    pub verified: bool,
    pub image: Option<String>,
}

pub trait ClaimsStrategy: Send + Sync {
    fn snapshot(&self, account: &Account) -> ClaimsSnapshot;
}

/// Identity-only claims: no display name or avatar leaks into tokens.
pub struct BasicClaims;

impl ClaimsStrategy for BasicClaims {
    fn snapshot(&self, account: &Account) -> ClaimsSnapshot {
        ClaimsSnapshot {
            username: account.username.clone(),
            name: account.username.clone(),
            verified: account.email_verified,
            image: None,
        }
    }
}

/// Full profile claims (the default).
pub struct ProfileClaims;

impl ClaimsStrategy for ProfileClaims {
    fn snapshot(&self, account: &Account) -> ClaimsSnapshot {
        ClaimsSnapshot {
            username: account.username.clone(),
            name: account.name.clone(),
            verified: account.email_verified,
            image: account.image_url.clone(),
        }
    }
}

/// Resolve a strategy by its configured name. Unknown names are a startup
/// error, not a fallback.
pub fn resolve_strategy(name: &str) -> Option<Arc<dyn ClaimsStrategy>> {
    match name {
        "basic" => Some(Arc::new(BasicClaims)),
        "profile" => Some(Arc::new(ProfileClaims)),
        _ => None,
    }
}
