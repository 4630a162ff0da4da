use std::sync::Arc;

use murmur_auth::config::AuthMethod;
use murmur_auth::error::AuthServiceError;
use murmur_auth::usecase::claims::ProfileClaims;
use murmur_auth::usecase::email_verification::EmailCodeDispatcher;
use murmur_auth::usecase::login::{LoginInput, LoginOutcome, LoginUseCase};

use murmur_auth_types::token::{TokenUse, validate_access_token, validate_token};

use crate::helpers::{
    MockAccountRepo, MockActivityRepo, MockEmailCodeRepo, MockMailer, MockMfaRepo, TEST_JWT_SECRET,
    TEST_PASSWORD, test_account, unverified_account,
};

struct Fixture {
    accounts: MockAccountRepo,
    mfa: MockMfaRepo,
    activities: MockActivityRepo,
    codes: MockEmailCodeRepo,
    mailer: MockMailer,
}

impl Fixture {
    fn new(accounts: MockAccountRepo) -> Self {
        Self {
            accounts,
            mfa: MockMfaRepo::default(),
            activities: MockActivityRepo::default(),
            codes: MockEmailCodeRepo::default(),
            mailer: MockMailer::default(),
        }
    }

    fn usecase(
        &self,
        auto_resend_email: bool,
    ) -> LoginUseCase<MockAccountRepo, MockEmailCodeRepo, MockMfaRepo, MockActivityRepo, MockMailer>
    {
        LoginUseCase {
            accounts: self.accounts.clone(),
            mfa: self.mfa.clone(),
            activities: self.activities.clone(),
            dispatcher: EmailCodeDispatcher {
                codes: self.codes.clone(),
                mailer: self.mailer.clone(),
                code_digits: 6,
            },
            claims: Arc::new(ProfileClaims),
            auth_methods: vec![AuthMethod::Username, AuthMethod::Email, AuthMethod::Phone],
            jwt_secret: TEST_JWT_SECRET.to_owned(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 3600,
            mfa_pending_ttl_secs: 120,
            auto_resend_email,
        }
    }
}

fn login_input(identifier: &str, password: &str) -> LoginInput {
    LoginInput {
        identifier: identifier.to_owned(),
        password: password.to_owned(),
        client: Default::default(),
    }
}

#[tokio::test]
async fn should_accept_username_email_and_phone_as_identifier() {
    let account = test_account();
    let fixture = Fixture::new(MockAccountRepo::new(vec![account.clone()]));
    let usecase = fixture.usecase(false);

    for identifier in ["alice", "alice@example.com", "+15550100"] {
        let outcome = usecase
            .execute(login_input(identifier, TEST_PASSWORD))
            .await
            .unwrap();
        let LoginOutcome::Success { account: found, tokens } = outcome else {
            panic!("expected success for identifier {identifier}");
        };
        assert_eq!(found.id, account.id);
        let info = validate_access_token(&tokens.access_token, TEST_JWT_SECRET).unwrap();
        assert_eq!(info.account_id, account.id);
    }
}

#[tokio::test]
async fn wrong_password_and_unknown_identifier_yield_identical_errors() {
    let fixture = Fixture::new(MockAccountRepo::new(vec![test_account()]));
    let usecase = fixture.usecase(false);

    let unknown = usecase
        .execute(login_input("nobody", TEST_PASSWORD))
        .await
        .unwrap_err();
    let wrong_password = usecase
        .execute(login_input("alice", "WrongPass1"))
        .await
        .unwrap_err();

    assert!(matches!(unknown, AuthServiceError::NoActiveAccount));
    assert!(matches!(wrong_password, AuthServiceError::NoActiveAccount));
    assert_eq!(unknown.to_string(), wrong_password.to_string());
    assert_eq!(unknown.kind(), wrong_password.kind());
}

#[tokio::test]
async fn unverified_account_gets_no_tokens() {
    let account = unverified_account();
    let fixture = Fixture::new(MockAccountRepo::new(vec![account.clone()]));
    let usecase = fixture.usecase(false);

    let outcome = usecase
        .execute(login_input("alice", TEST_PASSWORD))
        .await
        .unwrap();
    let LoginOutcome::Unverified { email } = outcome else {
        panic!("expected unverified outcome");
    };
    assert_eq!(email, account.email);
    // No auto-resend configured: no code, no mail, no activity.
    assert!(fixture.codes.current_code(account.id).is_none());
    assert_eq!(fixture.mailer.sent_count(), 0);
    assert!(fixture.activities.activities.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unverified_login_auto_resends_when_enabled() {
    let account = unverified_account();
    let fixture = Fixture::new(MockAccountRepo::new(vec![account.clone()]));
    let usecase = fixture.usecase(true);

    usecase
        .execute(login_input("alice", TEST_PASSWORD))
        .await
        .unwrap();

    let code = fixture.codes.current_code(account.id).unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(fixture.mailer.sent_count(), 1);
}

#[tokio::test]
async fn mfa_active_account_gets_pending_token_instead_of_session() {
    let account = test_account();
    let fixture = Fixture::new(MockAccountRepo::new(vec![account.clone()]));
    // Seed an activated MFA configuration.
    {
        use murmur_auth::domain::types::MfaConfig;
        fixture.mfa.configs.lock().unwrap().insert(
            account.id,
            MfaConfig {
                account_id: account.id,
                activated: true,
                activated_at: Some(chrono::Utc::now()),
                secret: Some("JBSWY3DPEHPK3PXP".to_owned()),
                recovery_codes: vec![],
                updated_at: chrono::Utc::now(),
            },
        );
    }
    let usecase = fixture.usecase(false);

    let outcome = usecase
        .execute(login_input("alice", TEST_PASSWORD))
        .await
        .unwrap();
    let LoginOutcome::MfaRequired { pending_token } = outcome else {
        panic!("expected mfa required");
    };

    // The pending token is only good for the MFA step.
    let claims = validate_token(&pending_token, TEST_JWT_SECRET, TokenUse::MfaPending).unwrap();
    assert_eq!(claims.sub, account.id.to_string());
    assert!(validate_access_token(&pending_token, TEST_JWT_SECRET).is_err());
    // Password alone is not a login.
    assert!(fixture.activities.activities.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_login_records_activity_and_last_login() {
    let account = test_account();
    let fixture = Fixture::new(MockAccountRepo::new(vec![account.clone()]));
    let usecase = fixture.usecase(false);

    let input = LoginInput {
        identifier: "alice".to_owned(),
        password: TEST_PASSWORD.to_owned(),
        client: murmur_auth::domain::types::ClientInfo {
            ip: Some("203.0.113.7".to_owned()),
            user_agent: "curl/8.0".to_owned(),
        },
    };
    usecase.execute(input).await.unwrap();

    let activities = fixture.activities.activities.lock().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].account_id, account.id);
    assert_eq!(activities[0].ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(activities[0].user_agent, "curl/8.0");
    let stored = fixture.accounts.get(account.id).unwrap();
    assert!(stored.last_login.is_some());
    // Mutators bump updated_at alongside the change.
    assert!(stored.updated_at > account.updated_at);
}
