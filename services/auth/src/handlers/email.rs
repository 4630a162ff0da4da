use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::email_verification::{
    EmailCodeDispatcher, ResendEmailInput, ResendEmailUseCase, VerifyEmailInput,
    VerifyEmailUseCase,
};

// ── POST /verify/email ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = VerifyEmailUseCase {
        accounts: state.account_repo(),
        codes: state.email_code_repo(),
        code_ttl_secs: state.config.email_code_ttl_secs,
    };
    usecase
        .execute(VerifyEmailInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(json!({ "msg": "email verified" })))
}

// ── POST /resend/email ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendEmailRequest {
    pub email: String,
}

pub async fn resend_email(
    State(state): State<AppState>,
    Json(body): Json<ResendEmailRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = ResendEmailUseCase {
        accounts: state.account_repo(),
        dispatcher: EmailCodeDispatcher {
            codes: state.email_code_repo(),
            mailer: state.mailer.clone(),
            code_digits: state.config.email_code_digits,
        },
    };
    usecase.execute(ResendEmailInput { email: body.email }).await?;
    Ok(Json(json!({ "msg": "verification code sent" })))
}
