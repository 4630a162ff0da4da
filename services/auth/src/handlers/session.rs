//! Login, MFA second step, token refresh and logout.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;

use murmur_auth_types::cookie::{
    MURMUR_MFA_PENDING, MURMUR_REFRESH_TOKEN, clear_all_cookies, clear_mfa_pending_cookie,
    clear_token_cookies, set_access_token_cookie, set_mfa_pending_cookie,
    set_refresh_token_cookie,
};

use crate::domain::types::ClientInfo;
use crate::error::AuthServiceError;
use crate::handlers::account::AccountResponse;
use crate::state::AppState;
use crate::usecase::email_verification::EmailCodeDispatcher;
use crate::usecase::login::{LoginInput, LoginOutcome, LoginUseCase};
use crate::usecase::mfa::{MfaLoginInput, MfaLoginUseCase};
use crate::usecase::token::{LogoutUseCase, RefreshTokenUseCase, TokenPair};

/// Write both token cookies with max-age equal to each token's lifetime.
fn set_session_cookies(jar: CookieJar, tokens: &TokenPair, state: &AppState) -> CookieJar {
    let opts = state.config.cookie_options();
    let jar = set_access_token_cookie(
        jar,
        tokens.access_token.clone(),
        &opts,
        state.config.access_token_ttl_secs as i64,
    );
    set_refresh_token_cookie(
        jar,
        tokens.refresh_token.clone(),
        &opts,
        state.config.refresh_token_ttl_secs as i64,
    )
}

// ── POST /login ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username, email or phone number, per the configured lookup order.
    pub login_field: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub account: AccountResponse,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    client: ClientInfo,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = LoginUseCase {
        accounts: state.account_repo(),
        mfa: state.mfa_repo(),
        activities: state.login_activity_repo(),
        dispatcher: EmailCodeDispatcher {
            codes: state.email_code_repo(),
            mailer: state.mailer.clone(),
            code_digits: state.config.email_code_digits,
        },
        claims: state.claims.clone(),
        auth_methods: state.config.auth_methods.clone(),
        jwt_secret: state.config.jwt_secret.clone(),
        access_ttl_secs: state.config.access_token_ttl_secs,
        refresh_ttl_secs: state.config.refresh_token_ttl_secs,
        mfa_pending_ttl_secs: state.config.mfa_pending_ttl_secs,
        auto_resend_email: state.config.auto_resend_email,
    };

    let outcome = usecase
        .execute(LoginInput {
            identifier: body.login_field,
            password: body.password,
            client,
        })
        .await?;

    let opts = state.config.cookie_options();
    Ok(match outcome {
        LoginOutcome::Unverified { email } => (
            StatusCode::OK,
            jar,
            Json(json!({
                "email": email,
                "msg": "verify your email address before logging in",
                "code": "email_unverified",
            })),
        ),
        LoginOutcome::MfaRequired { pending_token } => {
            // A pending cookie is not a session: any stale token cookies go.
            let jar = clear_token_cookies(jar, &opts);
            let jar = set_mfa_pending_cookie(
                jar,
                pending_token,
                &opts,
                state.config.mfa_pending_ttl_secs as i64,
            );
            (
                StatusCode::OK,
                jar,
                Json(json!({
                    "msg": "multi-factor authentication required",
                    "code": "mfa_required",
                })),
            )
        }
        LoginOutcome::Success { account, tokens } => {
            let jar = set_session_cookies(jar, &tokens, &state);
            let body = SessionResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                account: account.into(),
            };
            (
                StatusCode::OK,
                jar,
                Json(serde_json::to_value(body).map_err(anyhow::Error::from)?),
            )
        }
    })
}

// ── POST /mfa/login ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct MfaLoginRequest {
    /// Current OTP or an unused recovery code.
    pub code: String,
    /// Pending token, for clients that cannot carry the cookie.
    pub token: Option<String>,
}

pub async fn mfa_login(
    State(state): State<AppState>,
    jar: CookieJar,
    client: ClientInfo,
    Json(body): Json<MfaLoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let pending_token = jar
        .get(MURMUR_MFA_PENDING)
        .map(|c| c.value().to_owned())
        .or(body.token)
        .ok_or(AuthServiceError::InvalidToken)?;

    let usecase = MfaLoginUseCase {
        accounts: state.account_repo(),
        mfa: state.mfa_repo(),
        activities: state.login_activity_repo(),
        claims: state.claims.clone(),
        jwt_secret: state.config.jwt_secret.clone(),
        access_ttl_secs: state.config.access_token_ttl_secs,
        refresh_ttl_secs: state.config.refresh_token_ttl_secs,
        mfa_code_digits: state.config.mfa_code_digits,
        issuer: state.config.mfa_issuer.clone(),
    };

    let (account, tokens) = usecase
        .execute(MfaLoginInput {
            pending_token,
            code: body.code,
            client,
        })
        .await?;

    let opts = state.config.cookie_options();
    let jar = clear_mfa_pending_cookie(jar, &opts);
    let jar = set_session_cookies(jar, &tokens, &state);

    Ok((
        StatusCode::OK,
        jar,
        Json(SessionResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            account: account.into(),
        }),
    ))
}

// ── POST /token/refresh ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = body
        .and_then(|Json(b)| b.refresh_token)
        .or_else(|| jar.get(MURMUR_REFRESH_TOKEN).map(|c| c.value().to_owned()))
        .ok_or(AuthServiceError::InvalidRefreshToken)?;

    let usecase = RefreshTokenUseCase {
        blacklist: state.token_blacklist(),
        jwt_secret: state.config.jwt_secret.clone(),
        access_ttl_secs: state.config.access_token_ttl_secs,
        refresh_ttl_secs: state.config.refresh_token_ttl_secs,
    };

    let tokens = usecase.execute(&refresh_value).await?;
    let jar = set_session_cookies(jar, &tokens, &state);

    Ok((
        StatusCode::OK,
        jar,
        Json(RefreshResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

// ── POST /logout ──────────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = body
        .and_then(|Json(b)| b.refresh_token)
        .or_else(|| jar.get(MURMUR_REFRESH_TOKEN).map(|c| c.value().to_owned()));

    let usecase = LogoutUseCase {
        blacklist: state.token_blacklist(),
        jwt_secret: state.config.jwt_secret.clone(),
        blacklist_on_logout: state.config.blacklist_on_logout,
    };
    usecase.execute(refresh_value.as_deref()).await?;

    let jar = clear_all_cookies(jar, &state.config.cookie_options());
    Ok((StatusCode::OK, jar, Json(json!({ "msg": "logged out" }))))
}
