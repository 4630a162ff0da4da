use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Account as the auth service sees it.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    pub name: String,
    pub image_url: Option<String>,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Email verification code. One per account; a resend replaces it.
#[derive(Debug, Clone)]
pub struct EmailVerificationCode {
    pub account_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl EmailVerificationCode {
    /// Inclusive boundary: a code checked exactly at its expiry instant is
    /// already expired.
    pub fn is_expired(&self, ttl_secs: i64) -> bool {
        Utc::now() >= self.created_at + Duration::seconds(ttl_secs)
    }
}

/// Per-account MFA state.
///
/// `secret.is_none()` means no MFA record worth keeping (NONE state);
/// `secret.is_some() && !activated` is a setup in progress; `activated`
/// means confirmed with recovery codes issued.
#[derive(Debug, Clone)]
pub struct MfaConfig {
    pub account_id: Uuid,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub secret: Option<String>,
    pub recovery_codes: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl MfaConfig {
    pub fn empty(account_id: Uuid) -> Self {
        Self {
            account_id,
            activated: false,
            activated_at: None,
            secret: None,
            recovery_codes: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Password reset code, keyed by email, with attempt counting for cooldown.
#[derive(Debug, Clone)]
pub struct PasswordResetCode {
    pub email: String,
    pub code: String,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetCode {
    /// Inclusive boundary, same as the email verification code.
    pub fn is_expired(&self, ttl_secs: i64) -> bool {
        Utc::now() >= self.created_at + Duration::seconds(ttl_secs)
    }

    /// Seconds left in the cooldown window, floored at zero.
    pub fn cooldown_remaining_secs(&self, cooldown_secs: i64) -> i64 {
        let end = self.created_at + Duration::seconds(cooldown_secs);
        (end - Utc::now()).num_seconds().max(0)
    }
}

/// Append-only audit record of a successful login.
#[derive(Debug, Clone)]
pub struct LoginActivity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub ip: Option<String>,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Request metadata captured by handlers and passed to login use cases.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: String,
}

/// Email handed to the mail queue for asynchronous dispatch.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}
