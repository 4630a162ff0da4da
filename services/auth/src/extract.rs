//! Request extractors: the authenticated caller and client metadata.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum_extra::extract::CookieJar;
use http::request::Parts;

use murmur_auth_types::cookie::MURMUR_ACCESS_TOKEN;
use murmur_auth_types::token::{TokenInfo, validate_access_token};

use crate::domain::types::ClientInfo;
use crate::error::AuthServiceError;
use crate::state::AppState;

const USER_AGENT_MAX_LEN: usize = 255;

/// The authenticated caller, taken from the `Authorization: Bearer` header
/// or, failing that, the access-token cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub TokenInfo);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthServiceError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);

        let cookie_token = CookieJar::from_headers(&parts.headers)
            .get(MURMUR_ACCESS_TOKEN)
            .map(|c| c.value().to_owned());

        let result = bearer
            .or(cookie_token)
            .ok_or(AuthServiceError::InvalidToken)
            .and_then(|token| {
                validate_access_token(&token, &state.config.jwt_secret)
                    .map_err(|_| AuthServiceError::InvalidToken)
            });

        async move { result.map(Self) }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        // First hop of x-forwarded-for; the rest are proxies.
        let ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        let user_agent = parts
            .headers
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.chars().take(USER_AGENT_MAX_LEN).collect())
            .unwrap_or_else(|| "<unknown>".to_owned());

        async move { Ok(Self { ip, user_agent }) }
    }
}
