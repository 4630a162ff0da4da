use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailVerificationCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailVerificationCodes::AccountId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmailVerificationCodes::Code)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailVerificationCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                EmailVerificationCodes::Table,
                                EmailVerificationCodes::AccountId,
                            )
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailVerificationCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailVerificationCodes {
    Table,
    AccountId,
    Code,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
