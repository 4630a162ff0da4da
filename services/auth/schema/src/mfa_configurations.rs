use sea_orm::entity::prelude::*;

/// Per-account MFA state. The secret is present only while MFA is activated
/// or a setup is in progress; deactivation clears it along with the
/// recovery codes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mfa_configurations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
    pub activated: bool,
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Base32-encoded TOTP secret, unique across all accounts.
    #[sea_orm(unique)]
    pub secret: Option<String>,
    /// JSON array of single-use recovery code strings.
    pub recovery_codes: Json,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
