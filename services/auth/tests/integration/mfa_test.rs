use std::sync::Arc;

use totp_rs::{Algorithm, Secret, TOTP};

use murmur_auth::domain::types::Account;
use murmur_auth::error::AuthServiceError;
use murmur_auth::usecase::claims::{ClaimsSnapshot, ProfileClaims};
use murmur_auth::usecase::mfa::{
    ConfirmMfaUseCase, DeactivateMfaInput, DeactivateMfaUseCase, EnableMfaUseCase, MfaLoginInput,
    MfaLoginUseCase, MfaStatusUseCase, RegenerateRecoveryCodesUseCase,
};
use murmur_auth::usecase::token::issue_token;

use murmur_auth_types::token::TokenUse;

use crate::helpers::{
    MockAccountRepo, MockActivityRepo, MockMailer, MockMfaRepo, TEST_JWT_SECRET, TEST_PASSWORD,
    test_account,
};

const ISSUER: &str = "Murmur";

fn current_otp(secret_b32: &str) -> String {
    let totp = TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        Secret::Encoded(secret_b32.to_owned()).to_bytes().unwrap(),
        Some(ISSUER.to_owned()),
        "alice".to_owned(),
    )
    .unwrap();
    totp.generate_current().unwrap()
}

fn enable_usecase(mfa: &MockMfaRepo) -> EnableMfaUseCase<MockMfaRepo> {
    EnableMfaUseCase {
        mfa: mfa.clone(),
        mfa_code_digits: 6,
        issuer: ISSUER.to_owned(),
    }
}

fn confirm_usecase(
    mfa: &MockMfaRepo,
    mailer: &MockMailer,
) -> ConfirmMfaUseCase<MockMfaRepo, MockMailer> {
    ConfirmMfaUseCase {
        mfa: mfa.clone(),
        mailer: mailer.clone(),
        mfa_code_digits: 6,
        issuer: ISSUER.to_owned(),
        recovery_code_count: 10,
        recovery_code_len: 7,
        email_alerts: true,
    }
}

/// Enable and confirm MFA for the account, returning the secret and the
/// recovery codes.
async fn activate_mfa(
    mfa: &MockMfaRepo,
    mailer: &MockMailer,
    account: &Account,
) -> (String, Vec<String>) {
    let out = enable_usecase(mfa).execute(account).await.unwrap();
    let recovery_codes = confirm_usecase(mfa, mailer)
        .execute(account, &current_otp(&out.secret))
        .await
        .unwrap();
    (out.secret, recovery_codes)
}

fn pending_token(account: &Account) -> String {
    let snapshot = ClaimsSnapshot {
        username: account.username.clone(),
        name: account.name.clone(),
        verified: account.email_verified,
        image: None,
    };
    issue_token(account.id, &snapshot, TokenUse::MfaPending, 120, TEST_JWT_SECRET).unwrap()
}

fn mfa_login_usecase(
    accounts: &MockAccountRepo,
    mfa: &MockMfaRepo,
    activities: &MockActivityRepo,
) -> MfaLoginUseCase<MockAccountRepo, MockMfaRepo, MockActivityRepo> {
    MfaLoginUseCase {
        accounts: accounts.clone(),
        mfa: mfa.clone(),
        activities: activities.clone(),
        claims: Arc::new(ProfileClaims),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 3600,
        mfa_code_digits: 6,
        issuer: ISSUER.to_owned(),
    }
}

// ── Setup and confirmation ───────────────────────────────────────────────────

#[tokio::test]
async fn setup_yields_provisioning_url_and_stays_pending_until_confirmed() {
    let account = test_account();
    let mfa = MockMfaRepo::default();

    let out = enable_usecase(&mfa).execute(&account).await.unwrap();
    assert!(out.provisioning_url.starts_with("otpauth://totp/"));
    assert!(out.provisioning_url.contains(ISSUER));

    let config = mfa.get(account.id).unwrap();
    assert!(!config.activated);
    assert_eq!(config.secret.as_deref(), Some(out.secret.as_str()));
    assert!(config.recovery_codes.is_empty());
}

#[tokio::test]
async fn wrong_otp_keeps_setup_pending_and_correct_otp_activates() {
    let account = test_account();
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();

    let out = enable_usecase(&mfa).execute(&account).await.unwrap();

    // An OTP from a different secret never matches.
    let foreign_secret = Secret::generate_secret().to_encoded().to_string();
    let err = confirm_usecase(&mfa, &mailer)
        .execute(&account, &current_otp(&foreign_secret))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidOtp));
    assert!(!mfa.get(account.id).unwrap().activated);
    assert_eq!(mailer.sent_count(), 0);

    let recovery_codes = confirm_usecase(&mfa, &mailer)
        .execute(&account, &current_otp(&out.secret))
        .await
        .unwrap();
    assert_eq!(recovery_codes.len(), 10);
    assert!(recovery_codes.iter().all(|c| c.len() == 7));
    let config = mfa.get(account.id).unwrap();
    assert!(config.activated);
    assert!(config.activated_at.is_some());
    // Activation alert.
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn reopening_setup_keeps_the_pending_secret() {
    let account = test_account();
    let mfa = MockMfaRepo::default();

    let first = enable_usecase(&mfa).execute(&account).await.unwrap();
    let second = enable_usecase(&mfa).execute(&account).await.unwrap();

    // The QR code from the first call must still be valid.
    assert_eq!(second.secret, first.secret);
    assert_eq!(second.provisioning_url, first.provisioning_url);
    assert_eq!(
        mfa.get(account.id).unwrap().secret.as_deref(),
        Some(first.secret.as_str())
    );
}

#[tokio::test]
async fn setup_is_rejected_when_already_activated() {
    let account = test_account();
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    activate_mfa(&mfa, &mailer, &account).await;

    let err = enable_usecase(&mfa).execute(&account).await.unwrap_err();
    assert!(matches!(err, AuthServiceError::MfaAlreadyActivated));
}

// ── Second login step ────────────────────────────────────────────────────────

#[tokio::test]
async fn mfa_login_accepts_current_otp_and_records_activity() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let activities = MockActivityRepo::default();
    let (secret, _) = activate_mfa(&mfa, &mailer, &account).await;

    let (found, tokens) = mfa_login_usecase(&accounts, &mfa, &activities)
        .execute(MfaLoginInput {
            pending_token: pending_token(&account),
            code: current_otp(&secret),
            client: Default::default(),
        })
        .await
        .unwrap();

    assert_eq!(found.id, account.id);
    assert!(!tokens.access_token.is_empty());
    assert_eq!(activities.activities.lock().unwrap().len(), 1);
    assert!(accounts.get(account.id).unwrap().last_login.is_some());
}

#[tokio::test]
async fn mfa_login_rejects_wrong_otp() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let activities = MockActivityRepo::default();
    activate_mfa(&mfa, &mailer, &account).await;

    let foreign_secret = Secret::generate_secret().to_encoded().to_string();
    let err = mfa_login_usecase(&accounts, &mfa, &activities)
        .execute(MfaLoginInput {
            pending_token: pending_token(&account),
            code: current_otp(&foreign_secret),
            client: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidOtp));
    assert!(activities.activities.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mfa_login_rejects_access_token_as_pending_proof() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let activities = MockActivityRepo::default();
    let (secret, _) = activate_mfa(&mfa, &mailer, &account).await;

    let snapshot = ClaimsSnapshot {
        username: account.username.clone(),
        name: account.name.clone(),
        verified: true,
        image: None,
    };
    let access = issue_token(account.id, &snapshot, TokenUse::Access, 900, TEST_JWT_SECRET).unwrap();

    let err = mfa_login_usecase(&accounts, &mfa, &activities)
        .execute(MfaLoginInput {
            pending_token: access,
            code: current_otp(&secret),
            client: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidToken));
}

#[tokio::test]
async fn recovery_code_logs_in_exactly_once() {
    let account = test_account();
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let activities = MockActivityRepo::default();
    let (_, recovery_codes) = activate_mfa(&mfa, &mailer, &account).await;
    let code = recovery_codes[0].clone();

    let usecase = mfa_login_usecase(&accounts, &mfa, &activities);
    usecase
        .execute(MfaLoginInput {
            pending_token: pending_token(&account),
            code: code.clone(),
            client: Default::default(),
        })
        .await
        .unwrap();

    // Consumed: the stored set shrank and the code is dead.
    assert_eq!(mfa.get(account.id).unwrap().recovery_codes.len(), 9);
    let err = usecase
        .execute(MfaLoginInput {
            pending_token: pending_token(&account),
            code,
            client: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidOtp));
}

// ── Status, regeneration, deactivation ───────────────────────────────────────

#[tokio::test]
async fn status_reflects_activation_state() {
    let account = test_account();
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let status = MfaStatusUseCase { mfa: mfa.clone() };

    let out = status.execute(account.id).await.unwrap();
    assert!(!out.activated);
    assert!(out.recovery_codes.is_empty());

    let (_, recovery_codes) = activate_mfa(&mfa, &mailer, &account).await;
    let out = status.execute(account.id).await.unwrap();
    assert!(out.activated);
    assert_eq!(out.recovery_codes, recovery_codes);
}

#[tokio::test]
async fn regenerate_replaces_the_whole_recovery_set() {
    let account = test_account();
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let usecase = RegenerateRecoveryCodesUseCase {
        mfa: mfa.clone(),
        recovery_code_count: 10,
        recovery_code_len: 7,
    };

    // Not activated yet.
    let err = usecase.execute(account.id).await.unwrap_err();
    assert!(matches!(err, AuthServiceError::MfaNotActivated));

    let (_, old_codes) = activate_mfa(&mfa, &mailer, &account).await;
    let new_codes = usecase.execute(account.id).await.unwrap();
    assert_eq!(new_codes.len(), 10);
    assert_ne!(new_codes, old_codes);
    assert_eq!(mfa.get(account.id).unwrap().recovery_codes, new_codes);
}

#[tokio::test]
async fn deactivation_needs_password_and_a_second_factor() {
    let account = test_account();
    let mfa = MockMfaRepo::default();
    let mailer = MockMailer::default();
    let (secret, recovery_codes) = activate_mfa(&mfa, &mailer, &account).await;
    let usecase = DeactivateMfaUseCase {
        mfa: mfa.clone(),
        mailer: mailer.clone(),
        mfa_code_digits: 6,
        issuer: ISSUER.to_owned(),
        email_alerts: true,
    };

    let err = usecase
        .execute(
            &account,
            DeactivateMfaInput {
                password: "WrongPass1".to_owned(),
                code: current_otp(&secret),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidPassword));
    assert!(mfa.get(account.id).unwrap().activated);

    // A recovery code is an acceptable second factor.
    usecase
        .execute(
            &account,
            DeactivateMfaInput {
                password: TEST_PASSWORD.to_owned(),
                code: recovery_codes[0].clone(),
            },
        )
        .await
        .unwrap();
    let config = mfa.get(account.id).unwrap();
    assert!(!config.activated);
    assert!(config.secret.is_none());
    assert!(config.recovery_codes.is_empty());
}
