use sea_orm::*;
use chrono::Utc;
use crate::models::{comments, publications, users};
use crate::services::error::ServiceError;

pub struct CommentService;

impl CommentService {
    pub async fn create(
        db: &DatabaseConnection,
        user_id: i32,
        publication_id: i32,
        content: &str,
    ) -> Result<comments::Model, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::validation("Le commentaire ne peut pas être vide"));
        }

        let user = users::Entity::find_by_id(user_id).one(db).await?;
        if user.is_none() {
            return Err(ServiceError::not_found("Utilisateur non trouvé"));
        }
        let publication = publications::Entity::find_by_id(publication_id).one(db).await?;
        if publication.is_none() {
            return Err(ServiceError::not_found("Publication non trouvée"));
        }

        let now = Utc::now().naive_utc();
        let comment = comments::ActiveModel {
            content: Set(content.trim().to_string()),
            user_id: Set(user_id),
            publication_id: Set(publication_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(comment.insert(db).await?)
    }

    pub async fn list_by_publication(
        db: &DatabaseConnection,
        publication_id: i32,
    ) -> Result<Vec<comments::Model>, ServiceError> {
        Ok(comments::Entity::find()
            .filter(comments::Column::PublicationId.eq(publication_id))
            .order_by_asc(comments::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn delete(db: &DatabaseConnection, comment_id: i32) -> Result<(), ServiceError> {
        let comment = comments::Entity::find_by_id(comment_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Commentaire non trouvé avec l'ID: {}", comment_id))
            })?;

        let active: comments::ActiveModel = comment.into();
        active.delete(db).await?;
        Ok(())
    }
}
