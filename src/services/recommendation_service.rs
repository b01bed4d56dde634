use sea_orm::*;
use chrono::Utc;
use crate::models::{recommendations, users};
use crate::services::error::ServiceError;

pub struct RecommendationService;

impl RecommendationService {
    /// Enregistre la note d'un utilisateur (upsert: une seule recommandation
    /// par utilisateur, la note existante est mise à jour en place).
    /// Les administrateurs ne peuvent pas soumettre de recommandation.
    pub async fn save(
        db: &DatabaseConnection,
        user_id: i32,
        rating: i32,
    ) -> Result<recommendations::Model, ServiceError> {
        if !(0..=10).contains(&rating) {
            return Err(ServiceError::validation("La note doit être entre 0 et 10"));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Utilisateur non trouvé"))?;

        if user.is_admin() {
            return Err(ServiceError::policy(
                "Les administrateurs ne peuvent pas soumettre de recommandations",
            ));
        }

        let existing = recommendations::Entity::find()
            .filter(recommendations::Column::UserId.eq(user_id))
            .one(db)
            .await?;

        match existing {
            Some(recommendation) => {
                let mut active: recommendations::ActiveModel = recommendation.into();
                active.rating = Set(rating);
                Ok(active.update(db).await?)
            }
            None => {
                let recommendation = recommendations::ActiveModel {
                    user_id: Set(user_id),
                    rating: Set(rating),
                    created_at: Set(Utc::now().naive_utc()),
                    ..Default::default()
                };
                Ok(recommendation.insert(db).await?)
            }
        }
    }

    pub async fn get_user_recommendation(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Option<recommendations::Model>, ServiceError> {
        Ok(recommendations::Entity::find()
            .filter(recommendations::Column::UserId.eq(user_id))
            .one(db)
            .await?)
    }

    /// Note moyenne sur l'ensemble des recommandations, 0.0 s'il n'y en a aucune
    pub async fn get_average(db: &DatabaseConnection) -> Result<f64, ServiceError> {
        let recommendations = recommendations::Entity::find().all(db).await?;
        if recommendations.is_empty() {
            return Ok(0.0);
        }

        let sum: i64 = recommendations.iter().map(|r| i64::from(r.rating)).sum();
        Ok(sum as f64 / recommendations.len() as f64)
    }

    pub async fn get_total(db: &DatabaseConnection) -> Result<u64, ServiceError> {
        Ok(recommendations::Entity::find().count(db).await?)
    }

    pub async fn get_all(
        db: &DatabaseConnection,
    ) -> Result<Vec<recommendations::Model>, ServiceError> {
        Ok(recommendations::Entity::find()
            .order_by_desc(recommendations::Column::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn delete(
        db: &DatabaseConnection,
        recommendation_id: i32,
    ) -> Result<(), ServiceError> {
        let recommendation = recommendations::Entity::find_by_id(recommendation_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Recommandation non trouvée"))?;

        let active: recommendations::ActiveModel = recommendation.into();
        active.delete(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(id: i32, role: &str) -> users::Model {
        users::Model {
            id,
            username: None,
            password: None,
            email: format!("user{}@example.com", id),
            role: role.to_string(),
            email_verified: false,
            profile_photo: None,
            phone: None,
            address: None,
            is_online: false,
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample_recommendation(id: i32, user_id: i32, rating: i32) -> recommendations::Model {
        recommendations::Model {
            id,
            user_id,
            rating,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[tokio::test]
    async fn test_rating_out_of_bounds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        assert!(matches!(
            RecommendationService::save(&db, 1, 11).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            RecommendationService::save(&db, 1, -1).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_cannot_recommend() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_user(1, "ADMIN")]])
            .into_connection();

        let result = RecommendationService::save(&db, 1, 7).await;

        assert!(matches!(result, Err(ServiceError::Policy(_))));
    }

    #[tokio::test]
    async fn test_save_updates_existing_rating() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_user(1, "USER")]])
            .append_query_results([vec![sample_recommendation(5, 1, 7)]])
            .append_query_results([vec![sample_recommendation(5, 1, 3)]])
            .into_connection();

        let saved = RecommendationService::save(&db, 1, 3).await.unwrap();

        // Même enregistrement, note mise à jour: pas de doublon créé
        assert_eq!(saved.id, 5);
        assert_eq!(saved.rating, 3);
    }

    #[tokio::test]
    async fn test_average_of_empty_set_is_zero() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<recommendations::Model>::new()])
            .into_connection();

        let average = RecommendationService::get_average(&db).await.unwrap();

        assert_eq!(average, 0.0);
    }

    #[tokio::test]
    async fn test_average_over_ratings() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                sample_recommendation(1, 1, 4),
                sample_recommendation(2, 2, 8),
            ]])
            .into_connection();

        let average = RecommendationService::get_average(&db).await.unwrap();

        assert_eq!(average, 6.0);
    }
}
