
mod login_test;
mod mfa_test;
mod password_reset_test;
