use actix_web::{get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::services::user_service::UserService;

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePhotoRequest {
    pub photo_url: String,
}

/// GET /users/{id} - Profil public d'un utilisateur
#[get("/{id}")]
pub async fn get_user(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> HttpResponse {
    match UserService::find_by_id(db.get_ref(), path.into_inner()).await {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Utilisateur non trouvé"
        })),
        Err(e) => e.error_response(),
    }
}

/// PUT /users/profile - Téléphone et adresse de l'utilisateur authentifié
#[put("/profile")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::update_profile(
        db.get_ref(),
        auth_user.user_id,
        body.phone.as_deref(),
        body.address.as_deref(),
    )
    .await
    {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.error_response(),
    }
}

/// PUT /users/profile/photo
#[put("/profile/photo")]
pub async fn update_profile_photo(
    auth_user: AuthUser,
    body: web::Json<UpdatePhotoRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match UserService::update_profile_photo(db.get_ref(), auth_user.user_id, &body.photo_url).await
    {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.error_response(),
    }
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(update_profile_photo)
            .service(update_profile)
            .service(get_user)
    );
}
