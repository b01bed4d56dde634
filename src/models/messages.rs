use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub content: Option<String>, // Nullable: un message peut n'avoir qu'un fichier ou une localisation
    pub sender_id: i32,
    pub receiver_id: i32,
    pub is_read: bool,
    pub file_url: Option<String>, // URL du fichier attaché (image, document, etc.)
    pub file_name: Option<String>,
    pub file_type: Option<String>, // Type MIME du fichier
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>, // Nom de la localisation (adresse, lieu, etc.)
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReceiverId",
        to = "super::users::Column::Id"
    )]
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
