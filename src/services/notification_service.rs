use sea_orm::*;
use chrono::Utc;
use crate::models::{notifications, publications, users};
use crate::services::error::ServiceError;

// Taille de la colonne message en base
const MESSAGE_MAX_CHARS: usize = 500;

pub struct NotificationService;

impl NotificationService {
    /// Crée une notification pour un utilisateur.
    /// Appelé uniquement par les autres services (modération, messagerie),
    /// jamais directement par un client.
    pub async fn create(
        db: &DatabaseConnection,
        user_id: i32,
        message: &str,
        notification_type: &str,
        publication_id: Option<i32>,
    ) -> Result<notifications::Model, ServiceError> {
        let user = users::Entity::find_by_id(user_id).one(db).await?;
        if user.is_none() {
            return Err(ServiceError::not_found(format!(
                "Utilisateur non trouvé avec l'ID: {}",
                user_id
            )));
        }

        // Attacher la publication seulement si elle existe encore.
        // Une publication introuvable n'est pas une erreur: la référence est omise.
        let publication_ref = match publication_id {
            Some(pid) => publications::Entity::find_by_id(pid)
                .one(db)
                .await?
                .map(|p| p.id),
            None => None,
        };

        // Tronqué à la taille de la colonne: les appelants composent le
        // texte à partir de contenu utilisateur de longueur arbitraire.
        let message: String = message.chars().take(MESSAGE_MAX_CHARS).collect();

        let notification = notifications::ActiveModel {
            user_id: Set(user_id),
            message: Set(message),
            notification_type: Set(notification_type.to_string()),
            is_read: Set(false),
            publication_id: Set(publication_ref),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok(notification.insert(db).await?)
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        notification_id: i32,
    ) -> Result<Option<notifications::Model>, ServiceError> {
        Ok(notifications::Entity::find_by_id(notification_id)
            .one(db)
            .await?)
    }

    /// Toutes les notifications d'un utilisateur, les plus récentes d'abord.
    /// En cas d'erreur interne, retourne une liste vide (endpoint non critique).
    pub async fn list(db: &DatabaseConnection, user_id: i32) -> Vec<notifications::Model> {
        let result = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .all(db)
            .await;

        match result {
            Ok(list) => list,
            Err(e) => {
                eprintln!(
                    "❌ Erreur lors de la récupération des notifications pour l'utilisateur {}: {}",
                    user_id, e
                );
                Vec::new()
            }
        }
    }

    /// Notifications non lues d'un utilisateur, les plus récentes d'abord.
    pub async fn list_unread(db: &DatabaseConnection, user_id: i32) -> Vec<notifications::Model> {
        let result = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .order_by_desc(notifications::Column::CreatedAt)
            .all(db)
            .await;

        match result {
            Ok(list) => list,
            Err(e) => {
                eprintln!(
                    "❌ Erreur lors de la récupération des notifications non lues pour l'utilisateur {}: {}",
                    user_id, e
                );
                Vec::new()
            }
        }
    }

    /// Nombre de notifications non lues. Retourne 0 en cas d'erreur interne.
    pub async fn count_unread(db: &DatabaseConnection, user_id: i32) -> u64 {
        let result = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(db)
            .await;

        match result {
            Ok(count) => count,
            Err(e) => {
                eprintln!(
                    "❌ Erreur lors du comptage des notifications pour l'utilisateur {}: {}",
                    user_id, e
                );
                0
            }
        }
    }

    pub async fn mark_read(
        db: &DatabaseConnection,
        notification_id: i32,
    ) -> Result<notifications::Model, ServiceError> {
        let notification = notifications::Entity::find_by_id(notification_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "Notification non trouvée avec l'ID: {}",
                    notification_id
                ))
            })?;

        let mut active: notifications::ActiveModel = notification.into();
        active.is_read = Set(true);
        Ok(active.update(db).await?)
    }

    pub async fn mark_all_read(db: &DatabaseConnection, user_id: i32) -> Result<(), ServiceError> {
        let unread = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .all(db)
            .await?;

        for notification in unread {
            let mut active: notifications::ActiveModel = notification.into();
            active.is_read = Set(true);
            active.update(db).await?;
        }

        Ok(())
    }
}
