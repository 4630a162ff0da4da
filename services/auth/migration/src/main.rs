use sea_orm_migration::prelude::*;

mod m20260801_000001_create_accounts;
mod m20260801_000002_create_email_verification_codes;
mod m20260801_000003_create_mfa_configurations;
mod m20260801_000004_create_password_reset_codes;
mod m20260801_000005_create_login_activities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_accounts::Migration),
            Box::new(m20260801_000002_create_email_verification_codes::Migration),
            Box::new(m20260801_000003_create_mfa_configurations::Migration),
            Box::new(m20260801_000004_create_password_reset_codes::Migration),
            Box::new(m20260801_000005_create_login_activities::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
