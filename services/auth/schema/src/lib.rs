//! sea-orm entities for the auth service database.

pub mod accounts;
pub mod email_verification_codes;
pub mod login_activities;
pub mod mfa_configurations;
pub mod password_reset_codes;
