//! MFA management endpoints. All of them require an authenticated session;
//! the second login step lives in `session`.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::repository::AccountRepository;
use crate::domain::types::Account;
use crate::error::AuthServiceError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use crate::usecase::mfa::{
    ConfirmMfaUseCase, DeactivateMfaInput, DeactivateMfaUseCase, EnableMfaUseCase,
    MfaStatusUseCase, RegenerateRecoveryCodesUseCase,
};

async fn load_account(state: &AppState, user: &CurrentUser) -> Result<Account, AuthServiceError> {
    state
        .account_repo()
        .find_by_id(user.0.account_id)
        .await?
        .ok_or(AuthServiceError::NoActiveAccount)
}

// ── POST /mfa/activate ────────────────────────────────────────────────────────

pub async fn activate(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AuthServiceError> {
    let account = load_account(&state, &user).await?;
    let usecase = EnableMfaUseCase {
        mfa: state.mfa_repo(),
        mfa_code_digits: state.config.mfa_code_digits,
        issuer: state.config.mfa_issuer.clone(),
    };
    let out = usecase.execute(&account).await?;
    Ok(Json(json!({
        "url": out.provisioning_url,
        "secret": out.secret,
    })))
}

// ── POST /mfa/verify ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfirmMfaRequest {
    pub otp: String,
}

pub async fn verify(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ConfirmMfaRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let account = load_account(&state, &user).await?;
    let usecase = ConfirmMfaUseCase {
        mfa: state.mfa_repo(),
        mailer: state.mailer.clone(),
        mfa_code_digits: state.config.mfa_code_digits,
        issuer: state.config.mfa_issuer.clone(),
        recovery_code_count: state.config.recovery_code_count,
        recovery_code_len: state.config.recovery_code_len,
        email_alerts: state.config.mfa_email_alerts,
    };
    let recovery_codes = usecase.execute(&account, &body.otp).await?;
    Ok(Json(json!({
        "msg": "multi-factor authentication activated",
        "recovery_codes": recovery_codes,
    })))
}

// ── GET /mfa/status ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MfaStatusResponse {
    pub mfa_status: bool,
    #[serde(serialize_with = "murmur_core::serde::opt_to_rfc3339_ms")]
    pub activated_at: Option<DateTime<Utc>>,
    pub recovery_codes: Vec<String>,
}

pub async fn status(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = MfaStatusUseCase {
        mfa: state.mfa_repo(),
    };
    let out = usecase.execute(user.0.account_id).await?;
    Ok(Json(MfaStatusResponse {
        mfa_status: out.activated,
        activated_at: out.activated_at,
        recovery_codes: out.recovery_codes,
    }))
}

// ── POST /mfa/regenerate-codes ────────────────────────────────────────────────

pub async fn regenerate_codes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RegenerateRecoveryCodesUseCase {
        mfa: state.mfa_repo(),
        recovery_code_count: state.config.recovery_code_count,
        recovery_code_len: state.config.recovery_code_len,
    };
    let recovery_codes = usecase.execute(user.0.account_id).await?;
    Ok(Json(json!({ "recovery_codes": recovery_codes })))
}

// ── POST /mfa/deactivate ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeactivateMfaRequest {
    pub password: String,
    /// Current OTP or an unused recovery code.
    pub code: String,
}

pub async fn deactivate(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<DeactivateMfaRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let account = load_account(&state, &user).await?;
    let usecase = DeactivateMfaUseCase {
        mfa: state.mfa_repo(),
        mailer: state.mailer.clone(),
        mfa_code_digits: state.config.mfa_code_digits,
        issuer: state.config.mfa_issuer.clone(),
        email_alerts: state.config.mfa_email_alerts,
    };
    usecase
        .execute(
            &account,
            DeactivateMfaInput {
                password: body.password,
                code: body.code,
            },
        )
        .await?;
    Ok(Json(json!({ "msg": "multi-factor authentication deactivated" })))
}
