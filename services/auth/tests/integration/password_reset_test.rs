use chrono::{Duration, Utc};

use murmur_auth::domain::types::PasswordResetCode;
use murmur_auth::error::AuthServiceError;
use murmur_auth::usecase::password::verify_password;
use murmur_auth::usecase::password_reset::{
    ConfirmPasswordResetInput, ConfirmPasswordResetUseCase, RequestPasswordResetInput,
    RequestPasswordResetUseCase,
};

use crate::helpers::{MockAccountRepo, MockMailer, MockResetRepo, test_account};

const CODE_TTL_SECS: i64 = 600;
const COOLDOWN_SECS: i64 = 300;
const MAX_ATTEMPTS: i32 = 3;

fn request_usecase(
    accounts: &MockAccountRepo,
    resets: &MockResetRepo,
    mailer: &MockMailer,
) -> RequestPasswordResetUseCase<MockAccountRepo, MockResetRepo, MockMailer> {
    RequestPasswordResetUseCase {
        accounts: accounts.clone(),
        resets: resets.clone(),
        mailer: mailer.clone(),
        code_digits: 6,
        code_ttl_secs: CODE_TTL_SECS,
        cooldown_secs: COOLDOWN_SECS,
        max_attempts: MAX_ATTEMPTS,
    }
}

fn confirm_usecase(
    accounts: &MockAccountRepo,
    resets: &MockResetRepo,
) -> ConfirmPasswordResetUseCase<MockAccountRepo, MockResetRepo> {
    ConfirmPasswordResetUseCase {
        accounts: accounts.clone(),
        resets: resets.clone(),
        code_ttl_secs: CODE_TTL_SECS,
    }
}

fn request_input(email: &str) -> RequestPasswordResetInput {
    RequestPasswordResetInput {
        email: email.to_owned(),
    }
}

#[tokio::test]
async fn request_issues_code_and_counts_attempts() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    let mailer = MockMailer::default();
    let usecase = request_usecase(&accounts, &resets, &mailer);

    let out = usecase.execute(request_input(&account.email)).await.unwrap();
    assert_eq!(out.attempts, 1);
    let stored = resets.get(&account.email).unwrap();
    assert_eq!(stored.code.len(), 6);
    assert_eq!(mailer.sent_count(), 1);

    // A second request replaces the code and bumps the counter.
    let out = usecase.execute(request_input(&account.email)).await.unwrap();
    assert_eq!(out.attempts, 2);
    assert_eq!(mailer.sent_count(), 2);
}

#[tokio::test]
async fn request_for_unknown_email_is_rejected() {
    let accounts = MockAccountRepo::empty();
    let resets = MockResetRepo::default();
    let mailer = MockMailer::default();

    let err = request_usecase(&accounts, &resets, &mailer)
        .execute(request_input("nobody@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::NoActiveAccount));
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn cooldown_kicks_in_after_max_attempts() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    let mailer = MockMailer::default();
    let usecase = request_usecase(&accounts, &resets, &mailer);

    for expected in 1..=MAX_ATTEMPTS {
        let out = usecase.execute(request_input(&account.email)).await.unwrap();
        assert_eq!(out.attempts, expected);
    }

    let err = usecase
        .execute(request_input(&account.email))
        .await
        .unwrap_err();
    let AuthServiceError::TooManyResetAttempts { retry_after_secs } = err else {
        panic!("expected cooldown error, got {err:?}");
    };
    assert!(retry_after_secs > 0 && retry_after_secs <= COOLDOWN_SECS);
    assert_eq!(mailer.sent_count(), MAX_ATTEMPTS as usize);
}

#[tokio::test]
async fn served_cooldown_resets_the_counter() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    let mailer = MockMailer::default();
    // Maxed-out record whose cooldown has already elapsed but whose code is
    // still inside its ttl.
    resets.codes.lock().unwrap().insert(
        account.email.clone(),
        PasswordResetCode {
            email: account.email.clone(),
            code: "123456".to_owned(),
            attempts: MAX_ATTEMPTS,
            created_at: Utc::now() - Duration::seconds(COOLDOWN_SECS + 10),
        },
    );

    let out = request_usecase(&accounts, &resets, &mailer)
        .execute(request_input(&account.email))
        .await
        .unwrap();
    assert_eq!(out.attempts, 1);
}

#[tokio::test]
async fn expired_code_starts_a_fresh_attempt_window() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    let mailer = MockMailer::default();
    resets.codes.lock().unwrap().insert(
        account.email.clone(),
        PasswordResetCode {
            email: account.email.clone(),
            code: "123456".to_owned(),
            attempts: 2,
            created_at: Utc::now() - Duration::seconds(CODE_TTL_SECS),
        },
    );

    let out = request_usecase(&accounts, &resets, &mailer)
        .execute(request_input(&account.email))
        .await
        .unwrap();
    assert_eq!(out.attempts, 1);
}

#[tokio::test]
async fn confirm_updates_the_password_and_burns_the_code() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    let mailer = MockMailer::default();

    request_usecase(&accounts, &resets, &mailer)
        .execute(request_input(&account.email))
        .await
        .unwrap();
    let code = resets.get(&account.email).unwrap().code;

    confirm_usecase(&accounts, &resets)
        .execute(ConfirmPasswordResetInput {
            email: account.email.clone(),
            code: code.clone(),
            new_password: "N3wPassword".to_owned(),
            confirm_password: "N3wPassword".to_owned(),
        })
        .await
        .unwrap();

    let updated = accounts.get(account.id).unwrap();
    assert!(verify_password("N3wPassword", &updated.password_hash).unwrap());
    assert!(resets.get(&account.email).is_none());

    // The code is single use.
    let err = confirm_usecase(&accounts, &resets)
        .execute(ConfirmPasswordResetInput {
            email: account.email.clone(),
            code,
            new_password: "An0therPass".to_owned(),
            confirm_password: "An0therPass".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidCode));
}

#[tokio::test]
async fn confirm_rejects_wrong_weak_and_mismatched_input() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    resets.codes.lock().unwrap().insert(
        account.email.clone(),
        PasswordResetCode {
            email: account.email.clone(),
            code: "123456".to_owned(),
            attempts: 1,
            created_at: Utc::now(),
        },
    );
    let usecase = confirm_usecase(&accounts, &resets);

    let err = usecase
        .execute(ConfirmPasswordResetInput {
            email: account.email.clone(),
            code: "123456".to_owned(),
            new_password: "N3wPassword".to_owned(),
            confirm_password: "Different1".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::PasswordMismatch));

    let err = usecase
        .execute(ConfirmPasswordResetInput {
            email: account.email.clone(),
            code: "123456".to_owned(),
            new_password: "weakpass".to_owned(),
            confirm_password: "weakpass".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::WeakPassword));

    let err = usecase
        .execute(ConfirmPasswordResetInput {
            email: account.email.clone(),
            code: "654321".to_owned(),
            new_password: "N3wPassword".to_owned(),
            confirm_password: "N3wPassword".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidCode));
}

#[tokio::test]
async fn confirm_rejects_expired_code_at_the_boundary() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let resets = MockResetRepo::default();
    resets.codes.lock().unwrap().insert(
        account.email.clone(),
        PasswordResetCode {
            email: account.email.clone(),
            code: "123456".to_owned(),
            attempts: 1,
            created_at: Utc::now() - Duration::seconds(CODE_TTL_SECS),
        },
    );

    let err = confirm_usecase(&accounts, &resets)
        .execute(ConfirmPasswordResetInput {
            email: account.email.clone(),
            code: "123456".to_owned(),
            new_password: "N3wPassword".to_owned(),
            confirm_password: "N3wPassword".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::ExpiredCode));
    assert!(resets.get(&account.email).is_none());
}
