use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "utilisateur")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: Option<String>,
    #[serde(skip_serializing)] // Ne jamais exposer le hash du mot de passe en JSON
    pub password: Option<String>, // Format: pbkdf2:sha256:iterations$salt$hash
    #[sea_orm(unique)]
    pub email: String, // Stocké en minuscules (unicité insensible à la casse)
    pub role: String, // "USER" ou "ADMIN"
    pub email_verified: bool,
    pub profile_photo: Option<String>, // URL de la photo de profil
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_online: bool,
    pub last_login: Option<DateTime>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::publications::Entity")]
    Publications,

    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,

    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,

    #[sea_orm(has_one = "super::recommendations::Entity")]
    Recommendation,

    #[sea_orm(has_one = "super::carts::Entity")]
    Cart,
}

impl Related<super::publications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Publications.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::recommendations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recommendation.def()
    }
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Vérification de capacité simple
    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }
}
