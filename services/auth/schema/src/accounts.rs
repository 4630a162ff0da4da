use sea_orm::entity::prelude::*;

/// Account record owned by the auth service.
/// Accounts are never hard-deleted; profile mutations update in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    /// Display name shown in token claims and profiles.
    pub name: String,
    pub image_url: Option<String>,
    pub email_verified: bool,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::login_activities::Entity")]
    LoginActivities,
}

impl Related<super::login_activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoginActivities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
