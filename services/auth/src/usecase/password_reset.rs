//! Password reset: code issuance with attempt cooldown, and the reset itself.

use chrono::Utc;

use crate::domain::repository::{AccountRepository, MailerPort, PasswordResetRepository};
use crate::domain::types::{OutboundEmail, PasswordResetCode};
use crate::error::AuthServiceError;
use crate::usecase::generate_numeric_code;
use crate::usecase::password::{hash_password, validate_password_strength};

// ── RequestPasswordReset ─────────────────────────────────────────────────────

pub struct RequestPasswordResetInput {
    pub email: String,
}

#[derive(Debug)]
pub struct RequestPasswordResetOutput {
    /// Codes issued for this email within the current window, this one
    /// included. Resets to 1 when the previous code expired or the cooldown
    /// elapsed.
    pub attempts: i32,
}

pub struct RequestPasswordResetUseCase<A, P, M>
where
    A: AccountRepository,
    P: PasswordResetRepository,
    M: MailerPort,
{
    pub accounts: A,
    pub resets: P,
    pub mailer: M,
    pub code_digits: usize,
    pub code_ttl_secs: i64,
    pub cooldown_secs: i64,
    pub max_attempts: i32,
}

impl<A, P, M> RequestPasswordResetUseCase<A, P, M>
where
    A: AccountRepository,
    P: PasswordResetRepository,
    M: MailerPort,
{
    pub async fn execute(
        &self,
        input: RequestPasswordResetInput,
    ) -> Result<RequestPasswordResetOutput, AuthServiceError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::NoActiveAccount)?;

        let attempts = match self.resets.find(&account.email).await? {
            Some(existing) if !existing.is_expired(self.code_ttl_secs) => {
                if existing.attempts >= self.max_attempts {
                    let remaining = existing.cooldown_remaining_secs(self.cooldown_secs);
                    if remaining > 0 {
                        return Err(AuthServiceError::TooManyResetAttempts {
                            retry_after_secs: remaining,
                        });
                    }
                    // Cooldown served; the counter starts over.
                    1
                } else {
                    existing.attempts + 1
                }
            }
            Some(_) => {
                self.resets.delete(&account.email).await?;
                1
            }
            None => 1,
        };

        let code = generate_numeric_code(self.code_digits);
        self.resets
            .upsert(&PasswordResetCode {
                email: account.email.clone(),
                code: code.clone(),
                attempts,
                created_at: Utc::now(),
            })
            .await?;

        self.mailer
            .enqueue(OutboundEmail {
                to: account.email,
                subject: "Reset your password".to_owned(),
                body: format!("Your password reset code is {code}."),
            })
            .await?;

        Ok(RequestPasswordResetOutput { attempts })
    }
}

// ── ConfirmPasswordReset ─────────────────────────────────────────────────────

pub struct ConfirmPasswordResetInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ConfirmPasswordResetUseCase<A, P>
where
    A: AccountRepository,
    P: PasswordResetRepository,
{
    pub accounts: A,
    pub resets: P,
    pub code_ttl_secs: i64,
}

impl<A, P> ConfirmPasswordResetUseCase<A, P>
where
    A: AccountRepository,
    P: PasswordResetRepository,
{
    pub async fn execute(
        &self,
        input: ConfirmPasswordResetInput,
    ) -> Result<(), AuthServiceError> {
        if input.new_password != input.confirm_password {
            return Err(AuthServiceError::PasswordMismatch);
        }
        validate_password_strength(&input.new_password)?;

        let record = self
            .resets
            .find(&input.email)
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;
        if record.code != input.code {
            return Err(AuthServiceError::InvalidCode);
        }
        if record.is_expired(self.code_ttl_secs) {
            self.resets.delete(&input.email).await?;
            return Err(AuthServiceError::ExpiredCode);
        }

        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::NoActiveAccount)?;

        let hash = hash_password(&input.new_password)?;
        self.accounts.set_password_hash(account.id, &hash).await?;
        // Single use: the code dies with the reset.
        self.resets.delete(&input.email).await?;
        Ok(())
    }
}
