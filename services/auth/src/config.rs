use axum_extra::extract::cookie::SameSite;

use murmur_auth_types::cookie::CookieOptions;

/// Which identifier lookups the credential verifier tries, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Username,
    Email,
    Phone,
}

/// Auth service configuration loaded from environment variables.
///
/// Built once at startup and passed by reference through `AppState` —
/// components never reach for ambient globals.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (refresh-token blacklist).
    pub redis_url: String,
    /// HMAC secret for signing JWT access, refresh, and MFA-pending tokens.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    pub auth_port: u16,

    // Cookie attributes, applied uniformly to every cookie the service sets.
    pub cookie_domain: String,
    pub cookie_path: String,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,

    // Token lifetimes. Cookie max-age always equals the credential lifetime.
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub mfa_pending_ttl_secs: u64,

    // Email verification codes.
    pub email_code_digits: usize,
    pub email_code_ttl_secs: i64,
    /// Re-issue and resend the verification code on login when unverified.
    pub auto_resend_email: bool,

    // MFA.
    pub mfa_code_digits: usize,
    pub mfa_issuer: String,
    pub recovery_code_count: usize,
    pub recovery_code_len: usize,
    pub mfa_email_alerts: bool,

    // Password reset.
    pub reset_code_digits: usize,
    pub reset_code_ttl_secs: i64,
    pub reset_cooldown_secs: i64,
    pub reset_max_attempts: i32,

    // Signup.
    pub username_min_len: usize,
    pub disallowed_usernames: Vec<String>,

    /// Identifier lookup order for login.
    pub auth_methods: Vec<AuthMethod>,
    /// Blacklist the refresh token's jti on logout.
    pub blacklist_on_logout: bool,
    /// Named claims strategy resolved from the registry at startup.
    pub claims_strategy: String,

    // Outbound email.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub mail_queue_depth: usize,
    pub mail_max_retries: u32,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool_or(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn parse_same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

fn parse_auth_methods(value: &str) -> Vec<AuthMethod> {
    value
        .split(',')
        .filter_map(|m| match m.trim() {
            "username" => Some(AuthMethod::Username),
            "email" => Some(AuthMethod::Email),
            "phone" => Some(AuthMethod::Phone),
            _ => None,
        })
        .collect()
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            auth_port: env_parse_or("AUTH_PORT", 3112),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            cookie_path: env_or("COOKIE_PATH", "/"),
            cookie_secure: env_bool_or("COOKIE_SECURE", true),
            cookie_http_only: env_bool_or("COOKIE_HTTP_ONLY", true),
            cookie_same_site: parse_same_site(&env_or("COOKIE_SAMESITE", "lax")),
            access_token_ttl_secs: env_parse_or("ACCESS_TOKEN_TTL_SECS", 900),
            refresh_token_ttl_secs: env_parse_or("REFRESH_TOKEN_TTL_SECS", 604_800),
            mfa_pending_ttl_secs: env_parse_or("MFA_PENDING_TTL_SECS", 120),
            email_code_digits: env_parse_or("EMAIL_CODE_DIGITS", 6),
            email_code_ttl_secs: env_parse_or("EMAIL_CODE_TTL_SECS", 600),
            auto_resend_email: env_bool_or("AUTO_RESEND_EMAIL", false),
            mfa_code_digits: env_parse_or("MFA_CODE_DIGITS", 6),
            mfa_issuer: env_or("MFA_ISSUER", "Murmur"),
            recovery_code_count: env_parse_or("RECOVERY_CODE_COUNT", 10),
            recovery_code_len: env_parse_or("RECOVERY_CODE_LEN", 7),
            mfa_email_alerts: env_bool_or("MFA_EMAIL_ALERTS", true),
            reset_code_digits: env_parse_or("RESET_CODE_DIGITS", 6),
            reset_code_ttl_secs: env_parse_or("RESET_CODE_TTL_SECS", 600),
            reset_cooldown_secs: env_parse_or("RESET_COOLDOWN_SECS", 300),
            reset_max_attempts: env_parse_or("RESET_MAX_ATTEMPTS", 3),
            username_min_len: env_parse_or("USERNAME_MIN_LEN", 4),
            disallowed_usernames: env_or("DISALLOWED_USERNAMES", "admin,murmur,root")
                .split(',')
                .map(|s| s.trim().to_owned())
                .collect(),
            auth_methods: parse_auth_methods(&env_or("AUTH_METHODS", "username,email,phone")),
            blacklist_on_logout: env_bool_or("BLACKLIST_ON_LOGOUT", true),
            claims_strategy: env_or("CLAIMS_STRATEGY", "profile"),
            smtp_host: std::env::var("SMTP_HOST").expect("SMTP_HOST"),
            smtp_port: env_parse_or("SMTP_PORT", 465),
            smtp_username: std::env::var("SMTP_USERNAME").expect("SMTP_USERNAME"),
            smtp_password: std::env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD"),
            smtp_from: std::env::var("SMTP_FROM").expect("SMTP_FROM"),
            mail_queue_depth: env_parse_or("MAIL_QUEUE_DEPTH", 64),
            mail_max_retries: env_parse_or("MAIL_MAX_RETRIES", 3),
        }
    }

    /// Cookie attributes shared by every cookie this service writes.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            domain: self.cookie_domain.clone(),
            path: self.cookie_path.clone(),
            secure: self.cookie_secure,
            http_only: self.cookie_http_only,
            same_site: self.cookie_same_site,
        }
    }
}
