//! Cookie builders for the access, refresh, and MFA-pending tokens.
//!
//! Every cookie carries the same configured path/domain/secure/http-only/
//! same-site attributes; only the name, value, and max-age differ. Max-age
//! always equals the lifetime of the credential stored in the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const MURMUR_ACCESS_TOKEN: &str = "murmur_access_token";

/// Cookie name for the refresh token.
pub const MURMUR_REFRESH_TOKEN: &str = "murmur_refresh_token";

/// Cookie name for the MFA-pending token set between password and OTP steps.
pub const MURMUR_MFA_PENDING: &str = "murmur_mfa_pending";

/// Uniform cookie attributes, built once from service configuration.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    fn build(&self, name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .path(self.path.clone())
            .domain(self.domain.clone())
            .max_age(Duration::seconds(max_age_secs))
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .build()
    }
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            domain: String::new(),
            path: "/".to_owned(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Set the access-token cookie on the jar. Max-age = access-token lifetime.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use murmur_auth_types::cookie::{set_access_token_cookie, CookieOptions, MURMUR_ACCESS_TOKEN};
///
/// let opts = CookieOptions { domain: "example.com".into(), ..Default::default() };
/// let jar = set_access_token_cookie(CookieJar::new(), "token_value".to_string(), &opts, 900);
/// let cookie = jar.get(MURMUR_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(900)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(
    jar: CookieJar,
    value: String,
    opts: &CookieOptions,
    max_age_secs: i64,
) -> CookieJar {
    jar.add(opts.build(MURMUR_ACCESS_TOKEN, value, max_age_secs))
}

/// Set the refresh-token cookie on the jar. Max-age = refresh-token lifetime.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use murmur_auth_types::cookie::{set_refresh_token_cookie, CookieOptions, MURMUR_REFRESH_TOKEN};
///
/// let opts = CookieOptions { domain: "example.com".into(), ..Default::default() };
/// let jar = set_refresh_token_cookie(CookieJar::new(), "refresh_value".to_string(), &opts, 604800);
/// let cookie = jar.get(MURMUR_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// ```
pub fn set_refresh_token_cookie(
    jar: CookieJar,
    value: String,
    opts: &CookieOptions,
    max_age_secs: i64,
) -> CookieJar {
    jar.add(opts.build(MURMUR_REFRESH_TOKEN, value, max_age_secs))
}

/// Set the short-lived MFA-pending cookie issued after password verification
/// when the account still owes an OTP.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use murmur_auth_types::cookie::{set_mfa_pending_cookie, CookieOptions, MURMUR_MFA_PENDING};
///
/// let opts = CookieOptions { domain: "example.com".into(), ..Default::default() };
/// let jar = set_mfa_pending_cookie(CookieJar::new(), "pending".to_string(), &opts, 120);
/// let cookie = jar.get(MURMUR_MFA_PENDING).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(120)));
/// ```
pub fn set_mfa_pending_cookie(
    jar: CookieJar,
    value: String,
    opts: &CookieOptions,
    max_age_secs: i64,
) -> CookieJar {
    jar.add(opts.build(MURMUR_MFA_PENDING, value, max_age_secs))
}

/// Clear the access- and refresh-token cookies by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use murmur_auth_types::cookie::{
///     clear_token_cookies, set_access_token_cookie, CookieOptions, MURMUR_ACCESS_TOKEN,
/// };
///
/// let opts = CookieOptions { domain: "example.com".into(), ..Default::default() };
/// let jar = set_access_token_cookie(CookieJar::new(), "a".to_string(), &opts, 900);
/// let jar = clear_token_cookies(jar, &opts);
/// let access = jar.get(MURMUR_ACCESS_TOKEN).unwrap();
/// assert_eq!(access.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_token_cookies(jar: CookieJar, opts: &CookieOptions) -> CookieJar {
    let access = opts.build(MURMUR_ACCESS_TOKEN, String::new(), 0);
    let refresh = opts.build(MURMUR_REFRESH_TOKEN, String::new(), 0);
    jar.add(access).add(refresh)
}

/// Clear the MFA-pending cookie. Called once the OTP step succeeds.
pub fn clear_mfa_pending_cookie(jar: CookieJar, opts: &CookieOptions) -> CookieJar {
    jar.add(opts.build(MURMUR_MFA_PENDING, String::new(), 0))
}

/// Clear every cookie this crate knows about. Used on logout.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use murmur_auth_types::cookie::{
///     clear_all_cookies, set_mfa_pending_cookie, CookieOptions, MURMUR_MFA_PENDING,
/// };
///
/// let opts = CookieOptions { domain: "example.com".into(), ..Default::default() };
/// let jar = set_mfa_pending_cookie(CookieJar::new(), "m".to_string(), &opts, 120);
/// let jar = clear_all_cookies(jar, &opts);
/// assert_eq!(jar.get(MURMUR_MFA_PENDING).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_all_cookies(jar: CookieJar, opts: &CookieOptions) -> CookieJar {
    let jar = clear_token_cookies(jar, opts);
    clear_mfa_pending_cookie(jar, opts)
}
