use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::repository::{AccountRepository, LoginActivityRepository};
use crate::domain::types::{Account, LoginActivity};
use crate::error::AuthServiceError;
use crate::extract::CurrentUser;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
    pub image_url: Option<String>,
    pub email_verified: bool,
    #[serde(serialize_with = "murmur_core::serde::opt_to_rfc3339_ms")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(serialize_with = "murmur_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
            name: account.name,
            image_url: account.image_url,
            email_verified: account.email_verified,
            last_login: account.last_login,
            created_at: account.created_at,
        }
    }
}

// ── GET /me ───────────────────────────────────────────────────────────────────

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(info): CurrentUser,
) -> Result<Json<AccountResponse>, AuthServiceError> {
    let account = state
        .account_repo()
        .find_by_id(info.account_id)
        .await?
        .ok_or(AuthServiceError::NoActiveAccount)?;
    Ok(Json(account.into()))
}

// ── GET /login/activities ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LoginActivityResponse {
    pub id: Uuid,
    pub ip: Option<String>,
    pub user_agent: String,
    #[serde(serialize_with = "murmur_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<LoginActivity> for LoginActivityResponse {
    fn from(activity: LoginActivity) -> Self {
        Self {
            id: activity.id,
            ip: activity.ip,
            user_agent: activity.user_agent,
            created_at: activity.created_at,
        }
    }
}

/// The caller's login audit trail, newest first.
pub async fn login_activities(
    State(state): State<AppState>,
    CurrentUser(info): CurrentUser,
) -> Result<Json<Vec<LoginActivityResponse>>, AuthServiceError> {
    let activities = state
        .login_activity_repo()
        .list_for_account(info.account_id)
        .await?;
    Ok(Json(activities.into_iter().map(Into::into).collect()))
}
