//! Credential login: identifier lookup, the email-verification gate and the
//! MFA gate, in that order.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use murmur_auth_types::token::TokenUse;

use crate::config::AuthMethod;
use crate::domain::repository::{
    AccountRepository, EmailCodeRepository, LoginActivityRepository, MailerPort, MfaRepository,
};
use crate::domain::types::{Account, ClientInfo, LoginActivity};
use crate::error::AuthServiceError;
use crate::usecase::claims::ClaimsStrategy;
use crate::usecase::email_verification::EmailCodeDispatcher;
use crate::usecase::password::verify_password;
use crate::usecase::token::{TokenPair, issue_token, issue_token_pair};

/// Look up an account by trying each configured identifier form in order.
/// The caller cannot tell which form matched, nor whether the identifier or
/// the password was wrong.
pub async fn find_by_identifier<A: AccountRepository>(
    accounts: &A,
    methods: &[AuthMethod],
    identifier: &str,
) -> Result<Option<Account>, AuthServiceError> {
    for method in methods {
        let found = match method {
            AuthMethod::Username => accounts.find_by_username(identifier).await?,
            AuthMethod::Email => accounts.find_by_email(identifier).await?,
            AuthMethod::Phone => accounts.find_by_phone(identifier).await?,
        };
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

/// Stamp `last_login` and append a login activity row. Runs after tokens are
/// issued so a slow audit write never blocks a successful login response.
pub async fn record_login<A, L>(
    accounts: &A,
    activities: &L,
    account_id: Uuid,
    client: &ClientInfo,
) -> Result<(), AuthServiceError>
where
    A: AccountRepository,
    L: LoginActivityRepository,
{
    let now = Utc::now();
    accounts.set_last_login(account_id, now).await?;
    activities
        .insert(&LoginActivity {
            id: Uuid::now_v7(),
            account_id,
            ip: client.ip.clone(),
            user_agent: client.user_agent.clone(),
            created_at: now,
        })
        .await?;
    Ok(())
}

pub struct LoginInput {
    pub identifier: String,
    pub password: String,
    pub client: ClientInfo,
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials were right but the email is unverified. No tokens.
    Unverified { email: String },
    /// Credentials were right but MFA is active; the pending token proves the
    /// password step until the OTP arrives.
    MfaRequired { pending_token: String },
    /// Fully authenticated.
    Success { account: Account, tokens: TokenPair },
}

pub struct LoginUseCase<A, E, F, L, M>
where
    A: AccountRepository,
    E: EmailCodeRepository,
    F: MfaRepository,
    L: LoginActivityRepository,
    M: MailerPort,
{
    pub accounts: A,
    pub mfa: F,
    pub activities: L,
    pub dispatcher: EmailCodeDispatcher<E, M>,
    pub claims: Arc<dyn ClaimsStrategy>,
    pub auth_methods: Vec<AuthMethod>,
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub mfa_pending_ttl_secs: u64,
    pub auto_resend_email: bool,
}

impl<A, E, F, L, M> LoginUseCase<A, E, F, L, M>
where
    A: AccountRepository,
    E: EmailCodeRepository,
    F: MfaRepository,
    L: LoginActivityRepository,
    M: MailerPort,
{
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutcome, AuthServiceError> {
        let account =
            find_by_identifier(&self.accounts, &self.auth_methods, &input.identifier)
                .await?
                .ok_or(AuthServiceError::NoActiveAccount)?;

        if !verify_password(&input.password, &account.password_hash)? {
            return Err(AuthServiceError::NoActiveAccount);
        }

        if !account.email_verified {
            if self.auto_resend_email {
                self.dispatcher.dispatch(account.id, &account.email).await?;
            }
            return Ok(LoginOutcome::Unverified {
                email: account.email,
            });
        }

        let snapshot = self.claims.snapshot(&account);

        let mfa_active = self
            .mfa
            .find(account.id)
            .await?
            .map(|c| c.activated)
            .unwrap_or(false);
        if mfa_active {
            let pending_token = issue_token(
                account.id,
                &snapshot,
                TokenUse::MfaPending,
                self.mfa_pending_ttl_secs,
                &self.jwt_secret,
            )?;
            return Ok(LoginOutcome::MfaRequired { pending_token });
        }

        let tokens = issue_token_pair(
            account.id,
            &snapshot,
            &self.jwt_secret,
            self.access_ttl_secs,
            self.refresh_ttl_secs,
        )?;

        record_login(&self.accounts, &self.activities, account.id, &input.client).await?;

        Ok(LoginOutcome::Success { account, tokens })
    }
}
