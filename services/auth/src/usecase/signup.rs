//! Account registration and its field validators.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{AccountRepository, EmailCodeRepository, MailerPort};
use crate::domain::types::Account;
use crate::error::AuthServiceError;
use crate::usecase::email_verification::EmailCodeDispatcher;
use crate::usecase::password::{hash_password, validate_password_strength};

const USERNAME_MAX_LEN: usize = 30;

/// Usernames are ASCII alphanumerics plus underscore, bounded in length, and
/// must not collide with reserved names.
pub fn validate_username(
    username: &str,
    min_len: usize,
    disallowed: &[String],
) -> Result<(), AuthServiceError> {
    let len = username.chars().count();
    if len < min_len || len > USERNAME_MAX_LEN {
        return Err(AuthServiceError::InvalidUsername);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AuthServiceError::InvalidUsername);
    }
    if disallowed
        .iter()
        .any(|d| d.eq_ignore_ascii_case(username))
    {
        return Err(AuthServiceError::InvalidUsername);
    }
    Ok(())
}

pub struct SignupInput {
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct SignupUseCase<A, E, M>
where
    A: AccountRepository,
    E: EmailCodeRepository,
    M: MailerPort,
{
    pub accounts: A,
    pub dispatcher: EmailCodeDispatcher<E, M>,
    pub username_min_len: usize,
    pub disallowed_usernames: Vec<String>,
}

impl<A, E, M> SignupUseCase<A, E, M>
where
    A: AccountRepository,
    E: EmailCodeRepository,
    M: MailerPort,
{
    /// Create an unverified account and dispatch its first verification code.
    pub async fn execute(&self, input: SignupInput) -> Result<Account, AuthServiceError> {
        validate_username(&input.username, self.username_min_len, &self.disallowed_usernames)?;

        if input.password != input.confirm_password {
            return Err(AuthServiceError::PasswordMismatch);
        }
        validate_password_strength(&input.password)?;

        if self.accounts.find_by_email(&input.email).await?.is_some() {
            return Err(AuthServiceError::EmailExists);
        }
        if self
            .accounts
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AuthServiceError::UsernameExists);
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::now_v7(),
            email: input.email,
            username: input.username,
            phone_number: input.phone_number,
            password_hash: hash_password(&input.password)?,
            name: input.name,
            image_url: None,
            email_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(&account).await?;

        self.dispatcher.dispatch(account.id, &account.email).await?;

        Ok(account)
    }
}
