use sea_orm::*;
use chrono::Utc;
use crate::models::{comments, notifications, publications};
use crate::services::error::ServiceError;
use crate::services::notification_service::NotificationService;

pub struct PublicationService;

impl PublicationService {
    /// Publications visibles dans le catalogue (/shop): vérifiées ET in_catalog
    pub async fn get_catalog(
        db: &DatabaseConnection,
    ) -> Result<Vec<publications::Model>, ServiceError> {
        let publications = publications::Entity::find()
            .filter(publications::Column::Verified.eq(true))
            .filter(publications::Column::InCatalog.eq(true))
            .order_by_desc(publications::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(publications)
    }

    /// Publications visibles sur la page /publications: vérifiées ET in_publications
    pub async fn get_publications_page(
        db: &DatabaseConnection,
    ) -> Result<Vec<publications::Model>, ServiceError> {
        let publications = publications::Entity::find()
            .filter(publications::Column::Verified.eq(true))
            .filter(publications::Column::InPublications.eq(true))
            .order_by_desc(publications::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(publications)
    }

    /// Toutes les publications, y compris non vérifiées (admins uniquement)
    pub async fn get_all(
        db: &DatabaseConnection,
    ) -> Result<Vec<publications::Model>, ServiceError> {
        Ok(publications::Entity::find()
            .order_by_desc(publications::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<publications::Model>, ServiceError> {
        Ok(publications::Entity::find_by_id(id).one(db).await?)
    }

    pub async fn find_by_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<publications::Model>, ServiceError> {
        Ok(publications::Entity::find()
            .filter(publications::Column::UserId.eq(user_id))
            .order_by_desc(publications::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn find_unverified(
        db: &DatabaseConnection,
    ) -> Result<Vec<publications::Model>, ServiceError> {
        Ok(publications::Entity::find()
            .filter(publications::Column::Verified.eq(false))
            .order_by_desc(publications::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn find_by_status(
        db: &DatabaseConnection,
        status: &str,
    ) -> Result<Vec<publications::Model>, ServiceError> {
        Ok(publications::Entity::find()
            .filter(publications::Column::Status.eq(status))
            .order_by_desc(publications::Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// Crée une publication. Toujours non vérifiée et invisible à la création,
    /// quoi que le client ait envoyé: la vérification passe par un admin.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DatabaseConnection,
        title: &str,
        description: &str,
        publication_type: &str,
        price: f64,
        status: Option<&str>,
        file: Option<(String, String, String, i64)>, // (url, nom, type, taille)
        user_id: Option<i32>,
    ) -> Result<publications::Model, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::validation("Le titre ne peut pas être vide"));
        }
        if description.trim().is_empty() {
            return Err(ServiceError::validation("La description ne peut pas être vide"));
        }
        if publication_type.trim().is_empty() {
            return Err(ServiceError::validation("Le type ne peut pas être vide"));
        }
        if price <= 0.0 {
            return Err(ServiceError::validation("Le prix doit être positif"));
        }

        let now = Utc::now().naive_utc();
        let (file_url, file_name, file_type, file_size) = match file {
            Some((url, name, mime, size)) => (Some(url), Some(name), Some(mime), Some(size)),
            None => (None, None, None, None),
        };

        let publication = publications::ActiveModel {
            title: Set(title.trim().to_string()),
            description: Set(description.trim().to_string()),
            publication_type: Set(publication_type.trim().to_string()),
            price: Set(price),
            status: Set(status
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("DISPONIBLE")
                .to_string()),
            verified: Set(false),
            in_catalog: Set(false),
            in_publications: Set(false),
            verified_by: Set(None),
            verified_at: Set(None),
            file_url: Set(file_url),
            file_name: Set(file_name),
            file_type: Set(file_type),
            file_size: Set(file_size),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(publication.insert(db).await?)
    }

    /// Vérification explicite par un administrateur.
    /// Échoue si la publication est déjà vérifiée. Lecture, contrôle et
    /// mutation forment une seule transaction: deux vérifications
    /// concurrentes ne peuvent pas réussir toutes les deux. La notification
    /// au propriétaire est en mode best-effort, émise après le commit.
    pub async fn verify(
        db: &DatabaseConnection,
        publication_id: i32,
        admin_id: i32,
    ) -> Result<publications::Model, ServiceError> {
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;

        if publication.verified {
            return Err(ServiceError::policy("Cette publication est déjà vérifiée"));
        }

        let mut active: publications::ActiveModel = publication.into();
        active.verified = Set(true);
        active.verified_by = Set(Some(admin_id));
        active.verified_at = Set(Some(Utc::now().naive_utc()));
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;

        let message = format!(
            "Votre publication \"{}\" a été approuvée et est maintenant visible sur le site.",
            saved.title
        );
        Self::notify_owner(db, &saved, &message, "PUBLICATION_APPROVED").await;

        Ok(saved)
    }

    /// Retire la vérification (retour forcé à l'état non vérifié). Pas de notification.
    pub async fn unverify(
        db: &DatabaseConnection,
        publication_id: i32,
    ) -> Result<publications::Model, ServiceError> {
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;

        let mut active: publications::ActiveModel = publication.into();
        active.verified = Set(false);
        active.verified_by = Set(None);
        active.verified_at = Set(None);
        active.updated_at = Set(Utc::now().naive_utc());

        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(saved)
    }

    /// Place ou retire la publication du catalogue. Une publication non encore
    /// vérifiée est d'abord auto-vérifiée (verified_by = None).
    /// Notification uniquement sur la transition false → true.
    pub async fn set_in_catalog(
        db: &DatabaseConnection,
        publication_id: i32,
        in_catalog: bool,
    ) -> Result<publications::Model, ServiceError> {
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let was_in_catalog = publication.in_catalog;
        let was_verified = publication.verified;

        let mut active: publications::ActiveModel = publication.into();
        Self::auto_verify_if_needed(&mut active, was_verified);
        active.in_catalog = Set(in_catalog);
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;

        if in_catalog && !was_in_catalog {
            let message = format!(
                "Votre publication \"{}\" a été ajoutée au catalogue et est maintenant visible sur la page du catalogue.",
                saved.title
            );
            Self::notify_owner(db, &saved, &message, "PUBLICATION_IN_CATALOG").await;
        }

        Ok(saved)
    }

    /// Place ou retire la publication de la page /publications.
    /// Mêmes règles d'auto-vérification et de notification que le catalogue.
    pub async fn set_in_publications(
        db: &DatabaseConnection,
        publication_id: i32,
        in_publications: bool,
    ) -> Result<publications::Model, ServiceError> {
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let was_in_publications = publication.in_publications;
        let was_verified = publication.verified;

        let mut active: publications::ActiveModel = publication.into();
        Self::auto_verify_if_needed(&mut active, was_verified);
        active.in_publications = Set(in_publications);
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;

        if in_publications && !was_in_publications {
            let message = format!(
                "Votre publication \"{}\" a été ajoutée à la page des publications et est maintenant visible sur la page /publications.",
                saved.title
            );
            Self::notify_owner(db, &saved, &message, "PUBLICATION_IN_PUBLICATIONS").await;
        }

        Ok(saved)
    }

    pub async fn update_title(
        db: &DatabaseConnection,
        publication_id: i32,
        title: &str,
    ) -> Result<publications::Model, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::validation("Le titre ne peut pas être vide"));
        }
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let mut active: publications::ActiveModel = publication.into();
        active.title = Set(title.trim().to_string());
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(saved)
    }

    pub async fn update_description(
        db: &DatabaseConnection,
        publication_id: i32,
        description: &str,
    ) -> Result<publications::Model, ServiceError> {
        if description.trim().is_empty() {
            return Err(ServiceError::validation("La description ne peut pas être vide"));
        }
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let mut active: publications::ActiveModel = publication.into();
        active.description = Set(description.trim().to_string());
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(saved)
    }

    pub async fn update_type(
        db: &DatabaseConnection,
        publication_id: i32,
        publication_type: &str,
    ) -> Result<publications::Model, ServiceError> {
        if publication_type.trim().is_empty() {
            return Err(ServiceError::validation("Le type ne peut pas être vide"));
        }
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let mut active: publications::ActiveModel = publication.into();
        active.publication_type = Set(publication_type.trim().to_string());
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(saved)
    }

    pub async fn update_price(
        db: &DatabaseConnection,
        publication_id: i32,
        price: f64,
    ) -> Result<publications::Model, ServiceError> {
        if price <= 0.0 {
            return Err(ServiceError::validation("Le prix doit être positif"));
        }
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let mut active: publications::ActiveModel = publication.into();
        active.price = Set(price);
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(saved)
    }

    pub async fn update_status(
        db: &DatabaseConnection,
        publication_id: i32,
        status: &str,
    ) -> Result<publications::Model, ServiceError> {
        if status.trim().is_empty() {
            return Err(ServiceError::validation("Le statut ne peut pas être vide"));
        }
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;
        let mut active: publications::ActiveModel = publication.into();
        active.status = Set(status.trim().to_string());
        active.updated_at = Set(Utc::now().naive_utc());
        let saved = active.update(&txn).await?;
        txn.commit().await?;
        Ok(saved)
    }

    /// Supprime une publication et d'abord ses dépendants (commentaires,
    /// notifications) pour respecter les contraintes de clés étrangères.
    /// Le chemin direct exécute le tout dans une seule transaction; en cas
    /// d'échec elle est annulée et on retombe sur une suppression entité
    /// par entité, hors transaction, où chaque échec individuel est
    /// journalisé sans interrompre le reste. Des dépendants déjà absents
    /// ne sont pas une erreur.
    pub async fn delete(db: &DatabaseConnection, publication_id: i32) -> Result<(), ServiceError> {
        let txn = db.begin().await?;
        let publication = Self::fetch(&txn, publication_id).await?;

        match Self::delete_dependents_bulk(&txn, publication_id).await {
            Ok(()) => {
                let active: publications::ActiveModel = publication.into();
                active.delete(&txn).await?;
                txn.commit().await?;
            }
            Err(e) => {
                eprintln!(
                    "❌ Erreur lors de la suppression en masse des dépendants de la publication {}: {}",
                    publication_id, e
                );
                txn.rollback().await?;
                eprintln!("⚠️ Tentative de suppression entité par entité...");
                Self::delete_dependents_one_by_one(db, publication_id).await;
                let active: publications::ActiveModel = publication.into();
                active.delete(db).await?;
            }
        }

        Ok(())
    }

    /// Chemin direct: deux DELETE filtrés sur publication_id
    async fn delete_dependents_bulk<C: ConnectionTrait>(
        conn: &C,
        publication_id: i32,
    ) -> Result<(), DbErr> {
        let comments_deleted = comments::Entity::delete_many()
            .filter(comments::Column::PublicationId.eq(publication_id))
            .exec(conn)
            .await?;
        if comments_deleted.rows_affected > 0 {
            println!("✅ {} commentaire(s) supprimé(s)", comments_deleted.rows_affected);
        }

        let notifications_deleted = notifications::Entity::delete_many()
            .filter(notifications::Column::PublicationId.eq(publication_id))
            .exec(conn)
            .await?;
        if notifications_deleted.rows_affected > 0 {
            println!("✅ {} notification(s) supprimée(s)", notifications_deleted.rows_affected);
        }

        Ok(())
    }

    /// Chemin de secours: énumération puis suppression individuelle.
    /// Les échecs sont journalisés mais n'interrompent pas la suppression.
    async fn delete_dependents_one_by_one(db: &DatabaseConnection, publication_id: i32) {
        match comments::Entity::find()
            .filter(comments::Column::PublicationId.eq(publication_id))
            .all(db)
            .await
        {
            Ok(comments) => {
                for comment in comments {
                    let active: comments::ActiveModel = comment.into();
                    if let Err(e) = active.delete(db).await {
                        eprintln!("⚠️ Erreur lors de la suppression d'un commentaire: {}", e);
                    }
                }
            }
            Err(e) => eprintln!("⚠️ Erreur lors de la récupération des commentaires: {}", e),
        }

        match notifications::Entity::find()
            .filter(notifications::Column::PublicationId.eq(publication_id))
            .all(db)
            .await
        {
            Ok(notifications) => {
                for notification in notifications {
                    let active: notifications::ActiveModel = notification.into();
                    if let Err(e) = active.delete(db).await {
                        eprintln!("⚠️ Erreur lors de la suppression d'une notification: {}", e);
                    }
                }
            }
            Err(e) => eprintln!("⚠️ Erreur lors de la récupération des notifications: {}", e),
        }
    }

    async fn fetch<C: ConnectionTrait>(
        conn: &C,
        publication_id: i32,
    ) -> Result<publications::Model, ServiceError> {
        publications::Entity::find_by_id(publication_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "Publication non trouvée avec l'ID: {}",
                    publication_id
                ))
            })
    }

    /// Auto-vérification implicite lors d'un changement de drapeau de
    /// visibilité: verified_by reste None pour la distinguer d'une
    /// vérification explicite par un admin.
    fn auto_verify_if_needed(active: &mut publications::ActiveModel, was_verified: bool) {
        if !was_verified {
            active.verified = Set(true);
            active.verified_by = Set(None);
            active.verified_at = Set(Some(Utc::now().naive_utc()));
        }
    }

    /// Émission best-effort: un échec de notification est journalisé et avalé,
    /// la mutation de modération reste acquise.
    async fn notify_owner(
        db: &DatabaseConnection,
        publication: &publications::Model,
        message: &str,
        notification_type: &str,
    ) {
        let Some(owner_id) = publication.user_id else {
            return; // Publication sans propriétaire: personne à notifier
        };

        if let Err(e) = NotificationService::create(
            db,
            owner_id,
            message,
            notification_type,
            Some(publication.id),
        )
        .await
        {
            eprintln!("❌ Erreur lors de la création de la notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{notifications, publications, users};

    fn sample_publication(id: i32, verified: bool, in_catalog: bool) -> publications::Model {
        let now = chrono::Utc::now().naive_utc();
        publications::Model {
            id,
            title: "Réparer un ordinateur portable".to_string(),
            description: "Diagnostic et réparation".to_string(),
            publication_type: "CONSULTATION".to_string(),
            price: 50.0,
            status: "DISPONIBLE".to_string(),
            verified,
            in_catalog,
            in_publications: false,
            verified_by: None,
            verified_at: if verified { Some(now) } else { None },
            file_url: None,
            file_name: None,
            file_type: None,
            file_size: None,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_user(id: i32) -> users::Model {
        users::Model {
            id,
            username: Some("marie".to_string()),
            password: None,
            email: "marie@example.com".to_string(),
            role: "USER".to_string(),
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

    #[tokio::test]
    async fn test_create_is_always_unverified() {
        let mut created = sample_publication(1, false, false);
        created.verified = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created]])
            .into_connection();

        let publication = PublicationService::create(
            &db,
            "Réparer un ordinateur portable",
            "Diagnostic et réparation",
            "CONSULTATION",
            50.0,
            None,
            None,
            None,
        )
        .await
        .unwrap();

        assert!(!publication.verified);
        assert!(!publication.in_catalog);
        assert!(!publication.in_publications);
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_price() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result =
            PublicationService::create(&db, "Titre", "Description", "VENTE", 0.0, None, None, None)
                .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_already_verified_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_publication(1, true, false)]])
            .into_connection();

        let result = PublicationService::verify(&db, 1, 42).await;

        assert!(matches!(result, Err(ServiceError::Policy(_))));
    }

    #[tokio::test]
    async fn test_verify_sets_admin_and_notifies_owner() {
        let mut unverified = sample_publication(1, false, false);
        unverified.user_id = Some(7);
        let mut verified = sample_publication(1, true, false);
        verified.user_id = Some(7);
        verified.verified_by = Some(42);

        let notification = notifications::Model {
            id: 1,
            user_id: 7,
            message: "Votre publication \"Réparer un ordinateur portable\" a été approuvée et est maintenant visible sur le site.".to_string(),
            is_read: false,
            notification_type: "PUBLICATION_APPROVED".to_string(),
            publication_id: Some(1),
            created_at: chrono::Utc::now().naive_utc(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![unverified]])
            .append_query_results([vec![verified.clone()]])
            // Chemin de notification: utilisateur, publication, insertion
            .append_query_results([vec![sample_user(7)]])
            .append_query_results([vec![verified.clone()]])
            .append_query_results([vec![notification]])
            .into_connection();

        let saved = PublicationService::verify(&db, 1, 42).await.unwrap();

        assert!(saved.verified);
        assert_eq!(saved.verified_by, Some(42));
    }

    #[tokio::test]
    async fn test_set_in_catalog_auto_verifies() {
        let unverified = sample_publication(1, false, false);
        let mut after = sample_publication(1, true, true);
        after.verified_by = None; // Auto-vérification, pas d'admin

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![unverified]])
            .append_query_results([vec![after]])
            .into_connection();

        let saved = PublicationService::set_in_catalog(&db, 1, true).await.unwrap();

        assert!(saved.verified);
        assert!(saved.in_catalog);
        assert_eq!(saved.verified_by, None);
    }

    #[tokio::test]
    async fn test_delete_removes_dependents_then_publication() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_publication(1, true, false)]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 2 }, // commentaires
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // notifications
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // publication
            ])
            .into_connection();

        PublicationService::delete(&db, 1).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM \"comment\""));
        assert!(log.contains("DELETE FROM \"notification\""));
        assert!(log.contains("DELETE FROM \"publication\""));
    }

    #[tokio::test]
    async fn test_delete_falls_back_to_one_by_one() {
        let comment = comments::Model {
            id: 10,
            content: "Très bon service".to_string(),
            user_id: 7,
            publication_id: 1,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        let notification = notifications::Model {
            id: 20,
            user_id: 7,
            message: "Votre publication a été approuvée".to_string(),
            is_read: false,
            notification_type: "PUBLICATION_APPROVED".to_string(),
            publication_id: Some(1),
            created_at: chrono::Utc::now().naive_utc(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_publication(1, true, false)]])
            // Le DELETE en masse des commentaires échoue: bascule sur le
            // chemin entité par entité
            .append_exec_errors([DbErr::Custom("delete_many refusé".to_string())])
            .append_query_results([vec![comment]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .append_query_results([vec![notification]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // notification
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // publication
            ])
            .into_connection();

        PublicationService::delete(&db, 1).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM \"publication\""));
    }

    #[tokio::test]
    async fn test_verify_missing_publication() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<publications::Model>::new()])
            .into_connection();

        let result = PublicationService::verify(&db, 999, 42).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
