pub mod claims;
pub mod email_verification;
pub mod login;
pub mod mfa;
pub mod password;
pub mod password_reset;
pub mod signup;
pub mod token;

use rand::RngExt;

/// Random zero-padded numeric code, e.g. "042913" for `digits = 6`.
pub fn generate_numeric_code(digits: usize) -> String {
    let mut rng = rand::rng();
    let max = 10u64.pow(digits as u32);
    format!("{:0width$}", rng.random_range(0..max), width = digits)
}
