use sea_orm::*;
use chrono::Utc;
use crate::models::users;
use crate::services::error::ServiceError;
use crate::services::publication_service::PublicationService;
use crate::utils::password;

pub struct UserService;

impl UserService {
    /// Crée un compte. L'email est normalisé en minuscules (unicité
    /// insensible à la casse), le mot de passe est hashé, le rôle par
    /// défaut est USER.
    pub async fn create_account(
        db: &DatabaseConnection,
        email: &str,
        raw_password: &str,
        username: Option<&str>,
        role: Option<&str>,
    ) -> Result<users::Model, ServiceError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(ServiceError::validation("L'email est requis"));
        }
        if raw_password.is_empty() {
            return Err(ServiceError::validation("Le mot de passe est requis"));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::conflict(
                "Un utilisateur avec cet email existe déjà",
            ));
        }

        let password_hash = password::hash_password(raw_password)
            .map_err(|e| ServiceError::validation(format!("Hash du mot de passe impossible: {}", e)))?;

        let now = Utc::now().naive_utc();
        let user = users::ActiveModel {
            username: Set(username.map(str::to_string)),
            password: Set(Some(password_hash)),
            email: Set(email),
            role: Set(role.filter(|r| !r.is_empty()).unwrap_or("USER").to_string()),
            email_verified: Set(false),
            is_online: Set(false),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        Ok(user.insert(db).await?)
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<users::Model>, ServiceError> {
        Ok(users::Entity::find_by_id(user_id).one(db).await?)
    }

    /// Recherche insensible à la casse: les emails sont stockés en minuscules
    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<users::Model>, ServiceError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await?)
    }

    /// Le compte administrateur, via une requête filtrée sur le rôle
    pub async fn find_admin(db: &DatabaseConnection) -> Result<Option<users::Model>, ServiceError> {
        Ok(users::Entity::find()
            .filter(users::Column::Role.eq("ADMIN"))
            .one(db)
            .await?)
    }

    pub async fn get_all(db: &DatabaseConnection) -> Result<Vec<users::Model>, ServiceError> {
        Ok(users::Entity::find().all(db).await?)
    }

    /// Tous les utilisateurs non administrateurs (liste des interlocuteurs
    /// possibles pour l'admin)
    pub async fn get_all_non_admin(
        db: &DatabaseConnection,
    ) -> Result<Vec<users::Model>, ServiceError> {
        Ok(users::Entity::find()
            .filter(users::Column::Role.ne("ADMIN"))
            .all(db)
            .await?)
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        user_id: i32,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<users::Model, ServiceError> {
        let user = Self::fetch(db, user_id).await?;

        let mut active: users::ActiveModel = user.into();
        if let Some(phone) = phone {
            active.phone = Set(Some(phone.to_string()));
        }
        if let Some(address) = address {
            active.address = Set(Some(address.to_string()));
        }
        active.updated_at = Set(Some(Utc::now().naive_utc()));

        Ok(active.update(db).await?)
    }

    pub async fn update_profile_photo(
        db: &DatabaseConnection,
        user_id: i32,
        photo_url: &str,
    ) -> Result<users::Model, ServiceError> {
        let user = Self::fetch(db, user_id).await?;

        let mut active: users::ActiveModel = user.into();
        active.profile_photo = Set(Some(photo_url.to_string()));
        active.updated_at = Set(Some(Utc::now().naive_utc()));

        Ok(active.update(db).await?)
    }

    /// Statut de présence. Le passage en ligne met aussi à jour last_login.
    /// Un utilisateur introuvable est ignoré (appelé depuis login/logout).
    pub async fn set_online(
        db: &DatabaseConnection,
        user_id: i32,
        is_online: bool,
    ) -> Result<(), ServiceError> {
        if let Some(user) = users::Entity::find_by_id(user_id).one(db).await? {
            let mut active: users::ActiveModel = user.into();
            active.is_online = Set(is_online);
            if is_online {
                active.last_login = Set(Some(Utc::now().naive_utc()));
            }
            active.update(db).await?;
        }
        Ok(())
    }

    /// Suppression d'un utilisateur (admin). Les publications qu'il possède
    /// sont supprimées d'abord, chacune via le chemin de modération qui
    /// nettoie ses propres dépendants.
    pub async fn delete(db: &DatabaseConnection, user_id: i32) -> Result<(), ServiceError> {
        let user = Self::fetch(db, user_id).await?;

        let owned = PublicationService::find_by_user(db, user_id).await?;
        for publication in owned {
            if let Err(e) = PublicationService::delete(db, publication.id).await {
                eprintln!(
                    "⚠️ Erreur lors de la suppression de la publication {}: {}",
                    publication.id, e
                );
            }
        }

        let active: users::ActiveModel = user.into();
        active.delete(db).await?;
        Ok(())
    }

    async fn fetch(db: &DatabaseConnection, user_id: i32) -> Result<users::Model, ServiceError> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Utilisateur non trouvé"))
    }
}
