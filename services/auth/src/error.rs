use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// Credential failures collapse into `NoActiveAccount` regardless of whether
/// the identifier was unknown or the password was wrong, so responses carry
/// no account-enumeration signal.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("no active account found")]
    NoActiveAccount,
    #[error("the provided account details are invalid")]
    InvalidAccount,
    #[error("the provided code is invalid")]
    InvalidCode,
    #[error("the provided code has expired")]
    ExpiredCode,
    #[error("your email is already verified")]
    EmailAlreadyVerified,
    #[error("multi-factor authentication is not activated for this account")]
    MfaNotActivated,
    #[error("multi-factor authentication is already activated")]
    MfaAlreadyActivated,
    #[error("the provided otp is invalid")]
    InvalidOtp,
    #[error("the password provided is invalid")]
    InvalidPassword,
    #[error("the provided passwords do not match")]
    PasswordMismatch,
    #[error("password is not strong enough")]
    WeakPassword,
    #[error("invalid username")]
    InvalidUsername,
    #[error("an account with this email already exists")]
    EmailExists,
    #[error("an account with this username already exists")]
    UsernameExists,
    #[error("too many attempts, please try again after the cooldown period")]
    TooManyResetAttempts { retry_after_secs: i64 },
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoActiveAccount => "NO_ACTIVE_ACCOUNT",
            Self::InvalidAccount => "INVALID_ACCOUNT",
            Self::InvalidCode => "INVALID_CODE",
            Self::ExpiredCode => "EXPIRED_CODE",
            Self::EmailAlreadyVerified => "EMAIL_ALREADY_VERIFIED",
            Self::MfaNotActivated => "MFA_NOT_ACTIVATED",
            Self::MfaAlreadyActivated => "MFA_ALREADY_ACTIVATED",
            Self::InvalidOtp => "INVALID_OTP",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::UsernameExists => "USERNAME_EXISTS",
            Self::TooManyResetAttempts { .. } => "TOO_MANY_RESET_ATTEMPTS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NoActiveAccount
            | Self::InvalidToken
            | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::TooManyResetAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::TooManyResetAttempts { retry_after_secs } = &self {
            body["retry_after_secs"] = serde_json::json!(retry_after_secs);
        }
        (status, axum::Json(body)).into_response()
    }
}
