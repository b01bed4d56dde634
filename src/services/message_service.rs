use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::Utc;
use std::cmp::Ordering;
use crate::models::dto::BulkDeleteResult;
use crate::models::{messages, users};
use crate::services::error::ServiceError;
use crate::services::notification_service::NotificationService;

/// Longueur maximale de l'aperçu inséré dans la notification NEW_MESSAGE
const PREVIEW_LENGTH: usize = 50;

/// Taille de la colonne content en base
const CONTENT_MAX_CHARS: usize = 2000;

pub struct MessageService;

impl MessageService {
    /// Envoie un message direct.
    /// Un message doit contenir au moins un texte, un fichier ou une
    /// localisation. Un admin ne peut pas écrire à un autre admin.
    /// La notification au destinataire est best-effort.
    #[allow(clippy::too_many_arguments)]
    pub async fn send(
        db: &DatabaseConnection,
        sender_id: Option<i32>,
        receiver_id: Option<i32>,
        content: Option<&str>,
        file: Option<(String, Option<String>, Option<String>)>, // (url, nom, type MIME)
        location: Option<(f64, f64, Option<String>)>, // (latitude, longitude, nom du lieu)
    ) -> Result<messages::Model, ServiceError> {
        let sender_id =
            sender_id.ok_or_else(|| ServiceError::validation("L'ID de l'expéditeur est requis"))?;
        let receiver_id = receiver_id
            .ok_or_else(|| ServiceError::validation("L'ID du destinataire est requis"))?;

        // Le contenu vide après trim est traité comme absent
        let content = content.map(str::trim).filter(|c| !c.is_empty());
        let file = file.filter(|(url, _, _)| !url.trim().is_empty());

        if content.is_none() && file.is_none() && location.is_none() {
            return Err(ServiceError::validation(
                "Le message doit contenir du texte, un fichier ou une localisation",
            ));
        }
        if let Some(content) = content {
            if content.chars().count() > CONTENT_MAX_CHARS {
                return Err(ServiceError::validation(
                    "Le message ne peut pas dépasser 2000 caractères",
                ));
            }
        }

        let sender = users::Entity::find_by_id(sender_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Expéditeur non trouvé"))?;
        let receiver = users::Entity::find_by_id(receiver_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Destinataire non trouvé"))?;

        // L'administrateur ne peut envoyer des messages qu'aux utilisateurs
        if sender.is_admin() && receiver.is_admin() {
            return Err(ServiceError::policy(
                "L'administrateur ne peut envoyer des messages qu'aux utilisateurs",
            ));
        }

        let (file_url, file_name, file_type) = match file {
            Some((url, name, mime)) => (Some(url), name, mime),
            None => (None, None, None),
        };
        let (latitude, longitude, location_name) = match location {
            Some((lat, lon, name)) => (Some(lat), Some(lon), name),
            None => (None, None, None),
        };

        let now = Utc::now().naive_utc();
        let message = messages::ActiveModel {
            content: Set(content.map(str::to_string)),
            sender_id: Set(sender_id),
            receiver_id: Set(receiver_id),
            is_read: Set(false),
            file_url: Set(file_url),
            file_name: Set(file_name),
            file_type: Set(file_type),
            latitude: Set(latitude),
            longitude: Set(longitude),
            location_name: Set(location_name),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        let saved = message.insert(db).await?;
        println!("✅ Message enregistré avec l'ID: {}", saved.id);

        // Notification NEW_MESSAGE pour le destinataire: best-effort,
        // l'envoi du message reste acquis même si elle échoue.
        let sender_name = sender.username.clone().unwrap_or_else(|| sender.email.clone());
        let notification_message = format!(
            "Nouveau message de {}: {}",
            sender_name,
            content_preview(saved.content.as_deref())
        );
        if let Err(e) = NotificationService::create(
            db,
            receiver_id,
            &notification_message,
            "NEW_MESSAGE",
            None,
        )
        .await
        {
            eprintln!("❌ Erreur lors de la création de la notification de message: {}", e);
        }

        Ok(saved)
    }

    /// Conversation entre deux utilisateurs: les deux sens fusionnés,
    /// triés par date de création croissante. Les messages sans date de
    /// création sont placés en fin de liste (sous-ordre non spécifié).
    pub async fn get_conversation(
        db: &DatabaseConnection,
        user_id_a: i32,
        user_id_b: i32,
    ) -> Result<Vec<messages::Model>, ServiceError> {
        let outgoing = messages::Entity::find()
            .filter(messages::Column::SenderId.eq(user_id_a))
            .filter(messages::Column::ReceiverId.eq(user_id_b))
            .all(db)
            .await?;
        let incoming = messages::Entity::find()
            .filter(messages::Column::SenderId.eq(user_id_b))
            .filter(messages::Column::ReceiverId.eq(user_id_a))
            .all(db)
            .await?;

        let mut conversation = outgoing;
        conversation.extend(incoming);
        Ok(sort_conversation(conversation))
    }

    pub async fn find_by_sender(
        db: &DatabaseConnection,
        sender_id: i32,
    ) -> Result<Vec<messages::Model>, ServiceError> {
        Ok(messages::Entity::find()
            .filter(messages::Column::SenderId.eq(sender_id))
            .order_by_desc(messages::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn find_by_receiver(
        db: &DatabaseConnection,
        receiver_id: i32,
    ) -> Result<Vec<messages::Model>, ServiceError> {
        Ok(messages::Entity::find()
            .filter(messages::Column::ReceiverId.eq(receiver_id))
            .order_by_desc(messages::Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// Tous les messages (vue d'administration)
    pub async fn find_by_id(
        db: &DatabaseConnection,
        message_id: i32,
    ) -> Result<Option<messages::Model>, ServiceError> {
        Ok(messages::Entity::find_by_id(message_id).one(db).await?)
    }

    pub async fn get_all(db: &DatabaseConnection) -> Result<Vec<messages::Model>, ServiceError> {
        Ok(messages::Entity::find().all(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, message_id: i32) -> Result<(), ServiceError> {
        let message = messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Message non trouvé avec l'ID: {}", message_id))
            })?;

        let active: messages::ActiveModel = message.into();
        active.delete(db).await?;
        Ok(())
    }

    /// Suppression en masse, best-effort: chaque id est traité
    /// indépendamment, les ids introuvables sont collectés et rapportés,
    /// les suppressions déjà effectuées ne sont pas annulées.
    pub async fn delete_bulk(
        db: &DatabaseConnection,
        message_ids: &[i32],
    ) -> Result<BulkDeleteResult, ServiceError> {
        let mut deleted = 0;
        let mut missing = Vec::new();

        for &message_id in message_ids {
            match Self::delete(db, message_id).await {
                Ok(()) => deleted += 1,
                Err(ServiceError::NotFound(_)) => missing.push(message_id),
                Err(e) => return Err(e),
            }
        }

        Ok(BulkDeleteResult { deleted, missing })
    }

    /// Idempotent: un message introuvable n'est pas une erreur
    pub async fn mark_read(db: &DatabaseConnection, message_id: i32) -> Result<(), ServiceError> {
        if let Some(message) = messages::Entity::find_by_id(message_id).one(db).await? {
            let mut active: messages::ActiveModel = message.into();
            active.is_read = Set(true);
            active.update(db).await?;
        }
        Ok(())
    }

    /// Marque tous les messages non lus d'un destinataire en une seule requête
    pub async fn mark_all_read(
        db: &DatabaseConnection,
        receiver_id: i32,
    ) -> Result<(), ServiceError> {
        messages::Entity::update_many()
            .col_expr(messages::Column::IsRead, Expr::value(true))
            .filter(messages::Column::ReceiverId.eq(receiver_id))
            .filter(messages::Column::IsRead.eq(false))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn count_unread(
        db: &DatabaseConnection,
        receiver_id: i32,
    ) -> Result<u64, ServiceError> {
        Ok(messages::Entity::find()
            .filter(messages::Column::ReceiverId.eq(receiver_id))
            .filter(messages::Column::IsRead.eq(false))
            .count(db)
            .await?)
    }
}

/// Tri d'une conversation par date croissante, dates nulles en dernier.
/// Le sous-ordre des messages sans date est volontairement non spécifié.
pub fn sort_conversation(mut messages: Vec<messages::Model>) -> Vec<messages::Model> {
    messages.sort_by(|a, b| match (&a.created_at, &b.created_at) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(y),
    });
    messages
}

/// Aperçu du contenu pour la notification: 50 premiers caractères suivis
/// de "..." si le texte est plus long, ou un libellé de remplacement quand
/// le message n'a pas de texte.
pub fn content_preview(content: Option<&str>) -> String {
    match content.map(str::trim).filter(|c| !c.is_empty()) {
        Some(content) => {
            if content.chars().count() > PREVIEW_LENGTH {
                let truncated: String = content.chars().take(PREVIEW_LENGTH).collect();
                format!("{}...", truncated)
            } else {
                content.to_string()
            }
        }
        None => "[Message avec fichier/localisation]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users;

    fn sample_message(id: i32, created_at: Option<chrono::NaiveDateTime>) -> messages::Model {
        messages::Model {
            id,
            content: Some(format!("message {}", id)),
            sender_id: 1,
            receiver_id: 2,
            is_read: false,
            file_url: None,
            file_name: None,
            file_type: None,
            latitude: None,
            longitude: None,
            location_name: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn sample_user(id: i32, role: &str) -> users::Model {
        users::Model {
            id,
            username: Some(format!("user{}", id)),
            password: None,
            email: format!("user{}@example.com", id),
            role: role.to_string(),
            email_verified: true,
            profile_photo: None,
            phone: None,
            address: None,
            is_online: false,
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn ts(secs: i64) -> chrono::NaiveDateTime {
        chrono::DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
    }

    #[test]
    fn test_sort_conversation_ascending() {
        let messages = vec![
            sample_message(3, Some(ts(300))),
            sample_message(1, Some(ts(100))),
            sample_message(2, Some(ts(200))),
        ];

        let sorted = sort_conversation(messages);
        let ids: Vec<i32> = sorted.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_conversation_null_dates_last() {
        let messages = vec![
            sample_message(1, None),
            sample_message(2, Some(ts(200))),
            sample_message(3, Some(ts(100))),
        ];

        let sorted = sort_conversation(messages);
        assert_eq!(sorted[0].id, 3);
        assert_eq!(sorted[1].id, 2);
        assert!(sorted[2].created_at.is_none());
    }

    #[test]
    fn test_content_preview_truncates_long_content() {
        let long = "a".repeat(80);
        let preview = content_preview(Some(&long));
        assert_eq!(preview, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_content_preview_short_content_untouched() {
        assert_eq!(content_preview(Some("Bonjour")), "Bonjour");
    }

    #[test]
    fn test_content_preview_placeholder_when_absent() {
        assert_eq!(content_preview(None), "[Message avec fichier/localisation]");
        assert_eq!(content_preview(Some("   ")), "[Message avec fichier/localisation]");
    }

    #[tokio::test]
    async fn test_get_conversation_symmetric() {
        let from_a = sample_message(1, Some(ts(100))); // 1 → 2
        let mut from_b = sample_message(2, Some(ts(200))); // 2 → 1
        from_b.sender_id = 2;
        from_b.receiver_id = 1;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // get_conversation(1, 2): sortants de 1, puis sortants de 2
            .append_query_results([vec![from_a.clone()]])
            .append_query_results([vec![from_b.clone()]])
            // get_conversation(2, 1): sortants de 2, puis sortants de 1
            .append_query_results([vec![from_b]])
            .append_query_results([vec![from_a]])
            .into_connection();

        let a_b = MessageService::get_conversation(&db, 1, 2).await.unwrap();
        let b_a = MessageService::get_conversation(&db, 2, 1).await.unwrap();

        let a_b_ids: Vec<i32> = a_b.iter().map(|m| m.id).collect();
        let b_a_ids: Vec<i32> = b_a.iter().map(|m| m.id).collect();
        assert_eq!(a_b_ids, vec![1, 2]);
        assert_eq!(a_b_ids, b_a_ids);
    }

    #[tokio::test]
    async fn test_send_requires_some_payload() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = MessageService::send(&db, Some(1), Some(2), Some("   "), None, None).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_rejects_oversized_content() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let long = "a".repeat(2001);

        let result = MessageService::send(&db, Some(1), Some(2), Some(&long), None, None).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_requires_sender_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = MessageService::send(&db, None, Some(2), Some("Bonjour"), None, None).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_admin_to_admin_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_user(1, "ADMIN")]])
            .append_query_results([vec![sample_user(2, "ADMIN")]])
            .into_connection();

        let result = MessageService::send(&db, Some(1), Some(2), Some("Bonjour"), None, None).await;

        assert!(matches!(result, Err(ServiceError::Policy(_))));
    }

    #[tokio::test]
    async fn test_send_admin_to_user_allowed() {
        let saved = sample_message(1, Some(ts(100)));
        let notification = crate::models::notifications::Model {
            id: 1,
            user_id: 2,
            message: "Nouveau message de user1: message 1".to_string(),
            is_read: false,
            notification_type: "NEW_MESSAGE".to_string(),
            publication_id: None,
            created_at: ts(100),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_user(1, "ADMIN")]])
            .append_query_results([vec![sample_user(2, "USER")]])
            .append_query_results([vec![saved]])
            // Chemin de notification: résolution du destinataire puis insertion
            .append_query_results([vec![sample_user(2, "USER")]])
            .append_query_results([vec![notification]])
            .into_connection();

        let result =
            MessageService::send(&db, Some(1), Some(2), Some("message 1"), None, None).await;

        let message = result.unwrap();
        assert!(!message.is_read);
        assert_eq!(message.receiver_id, 2);
    }
}
