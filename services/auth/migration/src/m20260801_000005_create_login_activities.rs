use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginActivities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoginActivities::AccountId).uuid().not_null())
                    .col(ColumnDef::new(LoginActivities::Ip).string())
                    .col(
                        ColumnDef::new(LoginActivities::UserAgent)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoginActivities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LoginActivities::Table, LoginActivities::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(LoginActivities::Table)
                    .col(LoginActivities::AccountId)
                    .name("idx_login_activities_account_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginActivities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LoginActivities {
    Table,
    Id,
    AccountId,
    Ip,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
