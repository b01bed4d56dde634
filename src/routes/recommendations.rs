use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::models::dto::RecommendationStats;
use crate::services::recommendation_service::RecommendationService;

#[derive(Deserialize)]
pub struct SaveRecommendationRequest {
    pub rating: i32,
}

/// POST /recommendations - Note du site par l'utilisateur authentifié
/// (0 à 10, une seule note par utilisateur, mise à jour en place)
#[post("")]
pub async fn save_recommendation(
    auth_user: AuthUser,
    body: web::Json<SaveRecommendationRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match RecommendationService::save(db.get_ref(), auth_user.user_id, body.rating).await {
        Ok(recommendation) => HttpResponse::Ok().json(recommendation),
        Err(e) => e.error_response(),
    }
}

/// GET /recommendations/stats - Moyenne et total, public
#[get("/stats")]
pub async fn get_recommendation_stats(db: web::Data<DatabaseConnection>) -> HttpResponse {
    let average = RecommendationService::get_average(db.get_ref()).await;
    let total = RecommendationService::get_total(db.get_ref()).await;
    match (average, total) {
        (Ok(average), Ok(total)) => HttpResponse::Ok().json(RecommendationStats { average, total }),
        (Err(e), _) | (_, Err(e)) => e.error_response(),
    }
}

/// GET /recommendations/me - Note de l'utilisateur authentifié
#[get("/me")]
pub async fn get_my_recommendation(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match RecommendationService::get_user_recommendation(db.get_ref(), auth_user.user_id).await {
        Ok(recommendation) => HttpResponse::Ok().json(recommendation),
        Err(e) => e.error_response(),
    }
}

pub fn recommendation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/recommendations")
            .service(get_recommendation_stats)
            .service(get_my_recommendation)
            .service(save_recommendation)
    );
}
