use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::email_verification::EmailCodeDispatcher;
use crate::usecase::signup::{SignupInput, SignupUseCase};

// ── POST /signup ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub name: String,
    pub password1: String,
    pub password2: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignupUseCase {
        accounts: state.account_repo(),
        dispatcher: EmailCodeDispatcher {
            codes: state.email_code_repo(),
            mailer: state.mailer.clone(),
            code_digits: state.config.email_code_digits,
        },
        username_min_len: state.config.username_min_len,
        disallowed_usernames: state.config.disallowed_usernames.clone(),
    };

    let account = usecase
        .execute(SignupInput {
            email: body.email,
            username: body.username,
            phone_number: body.phone_number,
            name: body.name,
            password: body.password1,
            confirm_password: body.password2,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "email": account.email,
            "msg": "account created, check your email for a verification code",
        })),
    ))
}
