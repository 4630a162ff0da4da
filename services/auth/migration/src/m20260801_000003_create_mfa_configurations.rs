use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MfaConfigurations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MfaConfigurations::AccountId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MfaConfigurations::Activated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(MfaConfigurations::ActivatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(MfaConfigurations::Secret)
                            .string()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(MfaConfigurations::RecoveryCodes)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MfaConfigurations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MfaConfigurations::Table, MfaConfigurations::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MfaConfigurations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MfaConfigurations {
    Table,
    AccountId,
    Activated,
    ActivatedAt,
    Secret,
    RecoveryCodes,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
