use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::password_reset::{
    ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, RequestPasswordResetInput,
    RequestPasswordResetUseCase,
};

// ── POST /password/reset ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

pub async fn request_reset(
    State(state): State<AppState>,
    Json(body): Json<RequestResetRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RequestPasswordResetUseCase {
        accounts: state.account_repo(),
        resets: state.password_reset_repo(),
        mailer: state.mailer.clone(),
        code_digits: state.config.reset_code_digits,
        code_ttl_secs: state.config.reset_code_ttl_secs,
        cooldown_secs: state.config.reset_cooldown_secs,
        max_attempts: state.config.reset_max_attempts,
    };
    let email = body.email.clone();
    let out = usecase
        .execute(RequestPasswordResetInput { email: body.email })
        .await?;
    Ok(Json(json!({
        "msg": "password reset code sent",
        "attempts": out.attempts,
        "email": email,
    })))
}

// ── POST /password/reset/new ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfirmResetRequest {
    pub email: String,
    pub code: String,
    pub new_password1: String,
    pub new_password2: String,
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    Json(body): Json<ConfirmResetRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = ConfirmPasswordResetUseCase {
        accounts: state.account_repo(),
        resets: state.password_reset_repo(),
        code_ttl_secs: state.config.reset_code_ttl_secs,
    };
    usecase
        .execute(ConfirmPasswordResetInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password1,
            confirm_password: body.new_password2,
        })
        .await?;
    Ok(Json(json!({ "msg": "password reset successful" })))
}
