//! TOTP multi-factor authentication: setup, confirmation, status, recovery
//! codes, deactivation and the second login step.

use std::sync::Arc;

use chrono::Utc;
use totp_rs::{Algorithm, Secret, TOTP};
use uuid::Uuid;

use murmur_auth_types::token::{TokenUse, validate_token};

use crate::domain::repository::{
    AccountRepository, LoginActivityRepository, MailerPort, MfaRepository,
};
use crate::domain::types::{Account, ClientInfo, MfaConfig, OutboundEmail};
use crate::error::AuthServiceError;
use crate::usecase::claims::ClaimsStrategy;
use crate::usecase::generate_numeric_code;
use crate::usecase::login::record_login;
use crate::usecase::password::verify_password;
use crate::usecase::token::{TokenPair, issue_token_pair};

/// 30-second time step with one step of skew tolerance on either side.
fn build_totp(
    secret_b32: &str,
    digits: usize,
    issuer: &str,
    account_label: &str,
) -> Result<TOTP, AuthServiceError> {
    let secret = Secret::Encoded(secret_b32.to_owned())
        .to_bytes()
        .map_err(|e| anyhow::anyhow!("decode totp secret: {e:?}"))?;
    TOTP::new(
        Algorithm::SHA1,
        digits,
        1,
        30,
        secret,
        Some(issuer.to_owned()),
        account_label.to_owned(),
    )
    .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("build totp: {e}")))
}

fn check_otp(totp: &TOTP, otp: &str) -> Result<bool, AuthServiceError> {
    totp.check_current(otp)
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("system clock: {e}")))
}

/// Fresh base32 secret, retried until no other account holds it. The unique
/// index on the secret column backs this check.
async fn generate_unique_secret<F: MfaRepository>(mfa: &F) -> Result<String, AuthServiceError> {
    loop {
        let secret = Secret::generate_secret().to_encoded().to_string();
        if !mfa.secret_in_use(&secret).await? {
            return Ok(secret);
        }
    }
}

/// Zero-padded numeric recovery codes, e.g. "0412933" at length 7.
fn generate_recovery_codes(count: usize, len: usize) -> Vec<String> {
    (0..count).map(|_| generate_numeric_code(len)).collect()
}

async fn send_security_alert<M: MailerPort>(
    mailer: &M,
    email: &str,
    body: &str,
) -> Result<(), AuthServiceError> {
    mailer
        .enqueue(OutboundEmail {
            to: email.to_owned(),
            subject: "Security alert".to_owned(),
            body: body.to_owned(),
        })
        .await
}

// ── EnableMfa (setup) ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct EnableMfaOutput {
    pub secret: String,
    pub provisioning_url: String,
}

pub struct EnableMfaUseCase<F: MfaRepository> {
    pub mfa: F,
    pub mfa_code_digits: usize,
    pub issuer: String,
}

impl<F: MfaRepository> EnableMfaUseCase<F> {
    /// Start MFA setup: mint a secret and hand back the otpauth URL. The
    /// configuration stays pending until an OTP confirms the authenticator.
    /// Re-running setup before confirmation keeps the pending secret, so a
    /// QR code the user already scanned stays valid.
    pub async fn execute(&self, account: &Account) -> Result<EnableMfaOutput, AuthServiceError> {
        let existing = self.mfa.find(account.id).await?;
        if let Some(config) = &existing {
            if config.activated {
                return Err(AuthServiceError::MfaAlreadyActivated);
            }
        }

        let secret = match existing.and_then(|c| c.secret) {
            Some(secret) => secret,
            None => {
                let secret = generate_unique_secret(&self.mfa).await?;
                self.mfa
                    .upsert(&MfaConfig {
                        account_id: account.id,
                        activated: false,
                        activated_at: None,
                        secret: Some(secret.clone()),
                        recovery_codes: Vec::new(),
                        updated_at: Utc::now(),
                    })
                    .await?;
                secret
            }
        };

        let totp = build_totp(&secret, self.mfa_code_digits, &self.issuer, &account.username)?;
        Ok(EnableMfaOutput {
            provisioning_url: totp.get_url(),
            secret,
        })
    }
}

// ── ConfirmMfa (verify setup) ────────────────────────────────────────────────

pub struct ConfirmMfaUseCase<F: MfaRepository, M: MailerPort> {
    pub mfa: F,
    pub mailer: M,
    pub mfa_code_digits: usize,
    pub issuer: String,
    pub recovery_code_count: usize,
    pub recovery_code_len: usize,
    pub email_alerts: bool,
}

impl<F: MfaRepository, M: MailerPort> ConfirmMfaUseCase<F, M> {
    /// Confirm a pending setup with an OTP. Activation and recovery-code
    /// issuance happen together; codes are shown only here and via the
    /// status and regenerate endpoints.
    pub async fn execute(
        &self,
        account: &Account,
        otp: &str,
    ) -> Result<Vec<String>, AuthServiceError> {
        let config = self
            .mfa
            .find(account.id)
            .await?
            .ok_or(AuthServiceError::MfaNotActivated)?;
        if config.activated {
            return Err(AuthServiceError::MfaAlreadyActivated);
        }
        let secret = config
            .secret
            .as_deref()
            .ok_or(AuthServiceError::MfaNotActivated)?;

        let totp = build_totp(secret, self.mfa_code_digits, &self.issuer, &account.username)?;
        if !check_otp(&totp, otp)? {
            return Err(AuthServiceError::InvalidOtp);
        }

        let recovery_codes =
            generate_recovery_codes(self.recovery_code_count, self.recovery_code_len);
        self.mfa
            .upsert(&MfaConfig {
                account_id: account.id,
                activated: true,
                activated_at: Some(Utc::now()),
                secret: config.secret,
                recovery_codes: recovery_codes.clone(),
                updated_at: Utc::now(),
            })
            .await?;

        if self.email_alerts {
            send_security_alert(
                &self.mailer,
                &account.email,
                "Multi-factor authentication was activated on your account.",
            )
            .await?;
        }

        Ok(recovery_codes)
    }
}

// ── MfaStatus ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MfaStatusOutput {
    pub activated: bool,
    pub activated_at: Option<chrono::DateTime<Utc>>,
    pub recovery_codes: Vec<String>,
}

pub struct MfaStatusUseCase<F: MfaRepository> {
    pub mfa: F,
}

impl<F: MfaRepository> MfaStatusUseCase<F> {
    pub async fn execute(&self, account_id: Uuid) -> Result<MfaStatusOutput, AuthServiceError> {
        let config = self.mfa.find(account_id).await?;
        Ok(match config {
            Some(c) if c.activated => MfaStatusOutput {
                activated: true,
                activated_at: c.activated_at,
                recovery_codes: c.recovery_codes,
            },
            _ => MfaStatusOutput {
                activated: false,
                activated_at: None,
                recovery_codes: Vec::new(),
            },
        })
    }
}

// ── RegenerateRecoveryCodes ──────────────────────────────────────────────────

pub struct RegenerateRecoveryCodesUseCase<F: MfaRepository> {
    pub mfa: F,
    pub recovery_code_count: usize,
    pub recovery_code_len: usize,
}

impl<F: MfaRepository> RegenerateRecoveryCodesUseCase<F> {
    /// Replace the whole recovery code set. Old codes die immediately.
    pub async fn execute(&self, account_id: Uuid) -> Result<Vec<String>, AuthServiceError> {
        let config = self
            .mfa
            .find(account_id)
            .await?
            .filter(|c| c.activated)
            .ok_or(AuthServiceError::MfaNotActivated)?;

        let recovery_codes =
            generate_recovery_codes(self.recovery_code_count, self.recovery_code_len);
        self.mfa
            .upsert(&MfaConfig {
                recovery_codes: recovery_codes.clone(),
                updated_at: Utc::now(),
                ..config
            })
            .await?;
        Ok(recovery_codes)
    }
}

// ── DeactivateMfa ────────────────────────────────────────────────────────────

pub struct DeactivateMfaInput {
    pub password: String,
    /// Current OTP or an unused recovery code.
    pub code: String,
}

pub struct DeactivateMfaUseCase<F: MfaRepository, M: MailerPort> {
    pub mfa: F,
    pub mailer: M,
    pub mfa_code_digits: usize,
    pub issuer: String,
    pub email_alerts: bool,
}

impl<F: MfaRepository, M: MailerPort> DeactivateMfaUseCase<F, M> {
    /// Deactivation needs both the password and a second factor.
    pub async fn execute(
        &self,
        account: &Account,
        input: DeactivateMfaInput,
    ) -> Result<(), AuthServiceError> {
        if !verify_password(&input.password, &account.password_hash)? {
            return Err(AuthServiceError::InvalidPassword);
        }

        let config = self
            .mfa
            .find(account.id)
            .await?
            .filter(|c| c.activated)
            .ok_or(AuthServiceError::MfaNotActivated)?;
        let secret = config
            .secret
            .as_deref()
            .ok_or(AuthServiceError::MfaNotActivated)?;

        let totp = build_totp(secret, self.mfa_code_digits, &self.issuer, &account.username)?;
        let second_factor_ok =
            check_otp(&totp, &input.code)? || config.recovery_codes.contains(&input.code);
        if !second_factor_ok {
            return Err(AuthServiceError::InvalidOtp);
        }

        // Wipe rather than delete: the row records `updated_at` of the change.
        self.mfa.upsert(&MfaConfig::empty(account.id)).await?;

        if self.email_alerts {
            send_security_alert(
                &self.mailer,
                &account.email,
                "Multi-factor authentication was deactivated on your account.",
            )
            .await?;
        }
        Ok(())
    }
}

// ── MfaLogin (second step) ───────────────────────────────────────────────────

pub struct MfaLoginInput {
    /// The MFA-pending token minted by the first login step.
    pub pending_token: String,
    /// Current OTP or an unused recovery code.
    pub code: String,
    pub client: ClientInfo,
}

pub struct MfaLoginUseCase<A, F, L>
where
    A: AccountRepository,
    F: MfaRepository,
    L: LoginActivityRepository,
{
    pub accounts: A,
    pub mfa: F,
    pub activities: L,
    pub claims: Arc<dyn ClaimsStrategy>,
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub mfa_code_digits: usize,
    pub issuer: String,
}

impl<A, F, L> MfaLoginUseCase<A, F, L>
where
    A: AccountRepository,
    F: MfaRepository,
    L: LoginActivityRepository,
{
    pub async fn execute(
        &self,
        input: MfaLoginInput,
    ) -> Result<(Account, TokenPair), AuthServiceError> {
        let claims = validate_token(&input.pending_token, &self.jwt_secret, TokenUse::MfaPending)
            .map_err(|_| AuthServiceError::InvalidToken)?;
        let account_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthServiceError::NoActiveAccount)?;

        let config = self
            .mfa
            .find(account.id)
            .await?
            .filter(|c| c.activated)
            .ok_or(AuthServiceError::MfaNotActivated)?;
        let secret = config
            .secret
            .as_deref()
            .ok_or(AuthServiceError::MfaNotActivated)?;

        let totp = build_totp(secret, self.mfa_code_digits, &self.issuer, &account.username)?;
        if !check_otp(&totp, &input.code)? {
            // Fall back to recovery codes. Each code works exactly once:
            // consumption is persisted before tokens are issued.
            let mut remaining = config.recovery_codes.clone();
            let before = remaining.len();
            remaining.retain(|c| c != &input.code);
            if remaining.len() == before {
                return Err(AuthServiceError::InvalidOtp);
            }
            self.mfa
                .upsert(&MfaConfig {
                    recovery_codes: remaining,
                    updated_at: Utc::now(),
                    ..config
                })
                .await?;
        }

        let snapshot = self.claims.snapshot(&account);
        let tokens = issue_token_pair(
            account.id,
            &snapshot,
            &self.jwt_secret,
            self.access_ttl_secs,
            self.refresh_ttl_secs,
        )?;

        record_login(&self.accounts, &self.activities, account.id, &input.client).await?;

        Ok((account, tokens))
    }
}
