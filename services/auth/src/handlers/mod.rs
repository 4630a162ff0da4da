pub mod account;
pub mod email;
pub mod health;
pub mod mfa;
pub mod password;
pub mod session;
pub mod signup;
