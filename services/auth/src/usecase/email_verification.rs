//! Email verification: code dispatch, resend, and the verify gate.

use chrono::Utc;

use crate::domain::repository::{AccountRepository, EmailCodeRepository, MailerPort};
use crate::domain::types::{EmailVerificationCode, OutboundEmail};
use crate::error::AuthServiceError;
use crate::usecase::generate_numeric_code;

/// Issues a fresh verification code for an account, replacing any live one,
/// and queues the delivery email. Shared by signup, resend and the
/// auto-resend path of login.
pub struct EmailCodeDispatcher<E: EmailCodeRepository, M: MailerPort> {
    pub codes: E,
    pub mailer: M,
    pub code_digits: usize,
}

impl<E: EmailCodeRepository, M: MailerPort> EmailCodeDispatcher<E, M> {
    pub async fn dispatch(
        &self,
        account_id: uuid::Uuid,
        email: &str,
    ) -> Result<String, AuthServiceError> {
        let code = generate_numeric_code(self.code_digits);
        self.codes
            .upsert(&EmailVerificationCode {
                account_id,
                code: code.clone(),
                created_at: Utc::now(),
            })
            .await?;
        self.mailer
            .enqueue(OutboundEmail {
                to: email.to_owned(),
                subject: "Verify your email address".to_owned(),
                body: format!("Your verification code is {code}."),
            })
            .await?;
        Ok(code)
    }
}

// ── ResendEmail ──────────────────────────────────────────────────────────────

pub struct ResendEmailInput {
    pub email: String,
}

pub struct ResendEmailUseCase<A, E, M>
where
    A: AccountRepository,
    E: EmailCodeRepository,
    M: MailerPort,
{
    pub accounts: A,
    pub dispatcher: EmailCodeDispatcher<E, M>,
}

impl<A, E, M> ResendEmailUseCase<A, E, M>
where
    A: AccountRepository,
    E: EmailCodeRepository,
    M: MailerPort,
{
    pub async fn execute(&self, input: ResendEmailInput) -> Result<(), AuthServiceError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::NoActiveAccount)?;

        if account.email_verified {
            return Err(AuthServiceError::EmailAlreadyVerified);
        }

        self.dispatcher.dispatch(account.id, &account.email).await?;
        Ok(())
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyEmailUseCase<A, E>
where
    A: AccountRepository,
    E: EmailCodeRepository,
{
    pub accounts: A,
    pub codes: E,
    pub code_ttl_secs: i64,
}

impl<A, E> VerifyEmailUseCase<A, E>
where
    A: AccountRepository,
    E: EmailCodeRepository,
{
    pub async fn execute(&self, input: VerifyEmailInput) -> Result<(), AuthServiceError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::NoActiveAccount)?;

        if account.email_verified {
            return Err(AuthServiceError::EmailAlreadyVerified);
        }

        let record = self
            .codes
            .find(account.id)
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        if record.code != input.code {
            return Err(AuthServiceError::InvalidCode);
        }

        if record.is_expired(self.code_ttl_secs) {
            self.codes.delete(account.id).await?;
            return Err(AuthServiceError::ExpiredCode);
        }

        // Verify-once: the code is deleted in the same flow that flips the
        // flag, so replaying it can never succeed.
        self.accounts.set_email_verified(account.id).await?;
        self.codes.delete(account.id).await?;
        Ok(())
    }
}
