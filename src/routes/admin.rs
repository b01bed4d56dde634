use actix_web::{delete, get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::routes::require_admin;
use crate::services::publication_service::PublicationService;
use crate::services::recommendation_service::RecommendationService;
use crate::services::user_service::UserService;

// Corps générique pour poser un drapeau de visibilité
#[derive(Deserialize)]
pub struct SetFlagRequest {
    pub value: bool,
}

#[derive(Deserialize)]
pub struct UpdateTextRequest {
    pub value: String,
}

#[derive(Deserialize)]
pub struct UpdatePriceRequest {
    pub price: f64,
}

/// GET /admin/publications - Toutes les publications, y compris non vérifiées
#[get("/publications")]
pub async fn get_all_publications(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::get_all(db.get_ref()).await {
        Ok(publications) => HttpResponse::Ok().json(publications),
        Err(e) => e.error_response(),
    }
}

/// GET /admin/publications/unverified - Publications en attente de modération
#[get("/publications/unverified")]
pub async fn get_unverified_publications(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::find_unverified(db.get_ref()).await {
        Ok(publications) => HttpResponse::Ok().json(publications),
        Err(e) => e.error_response(),
    }
}

/// GET /admin/publications/status/{status} - Publications par statut
#[get("/publications/status/{status}")]
pub async fn get_publications_by_status(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::find_by_status(db.get_ref(), &path.into_inner()).await {
        Ok(publications) => HttpResponse::Ok().json(publications),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/verify - Vérification explicite.
/// L'id de l'admin vient de l'utilisateur authentifié.
#[put("/publications/{id}/verify")]
pub async fn verify_publication(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::verify(db.get_ref(), path.into_inner(), auth_user.user_id).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/unverify - Retour forcé à non vérifiée
#[put("/publications/{id}/unverify")]
pub async fn unverify_publication(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::unverify(db.get_ref(), path.into_inner()).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/in-catalog - Présence dans le catalogue
#[put("/publications/{id}/in-catalog")]
pub async fn set_in_catalog(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<SetFlagRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::set_in_catalog(db.get_ref(), path.into_inner(), body.value).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/in-publications - Présence sur la page /publications
#[put("/publications/{id}/in-publications")]
pub async fn set_in_publications(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<SetFlagRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::set_in_publications(db.get_ref(), path.into_inner(), body.value).await
    {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/title
#[put("/publications/{id}/title")]
pub async fn update_title(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateTextRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::update_title(db.get_ref(), path.into_inner(), &body.value).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/description
#[put("/publications/{id}/description")]
pub async fn update_description(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateTextRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::update_description(db.get_ref(), path.into_inner(), &body.value).await
    {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/type
#[put("/publications/{id}/type")]
pub async fn update_type(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateTextRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::update_type(db.get_ref(), path.into_inner(), &body.value).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/price
#[put("/publications/{id}/price")]
pub async fn update_price(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdatePriceRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::update_price(db.get_ref(), path.into_inner(), body.price).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// PUT /admin/publications/{id}/status
#[put("/publications/{id}/status")]
pub async fn update_status(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateTextRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::update_status(db.get_ref(), path.into_inner(), &body.value).await {
        Ok(publication) => HttpResponse::Ok().json(publication),
        Err(e) => e.error_response(),
    }
}

/// DELETE /admin/publications/{id} - Supprime la publication et ses
/// dépendants (commentaires, notifications)
#[delete("/publications/{id}")]
pub async fn delete_publication(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match PublicationService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

/// GET /admin/users - Tous les utilisateurs
#[get("/users")]
pub async fn get_all_users(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match UserService::get_all(db.get_ref()).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => e.error_response(),
    }
}

/// DELETE /admin/users/{id} - Supprime un utilisateur et ses publications
#[delete("/users/{id}")]
pub async fn delete_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match UserService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

/// GET /admin/recommendations - Toutes les recommandations
#[get("/recommendations")]
pub async fn get_all_recommendations(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match RecommendationService::get_all(db.get_ref()).await {
        Ok(recommendations) => HttpResponse::Ok().json(recommendations),
        Err(e) => e.error_response(),
    }
}

/// DELETE /admin/recommendations/{id}
#[delete("/recommendations/{id}")]
pub async fn delete_recommendation(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match RecommendationService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(get_unverified_publications)
            .service(get_publications_by_status)
            .service(get_all_publications)
            .service(verify_publication)
            .service(unverify_publication)
            .service(set_in_catalog)
            .service(set_in_publications)
            .service(update_title)
            .service(update_description)
            .service(update_type)
            .service(update_price)
            .service(update_status)
            .service(delete_publication)
            .service(get_all_users)
            .service(delete_user)
            .service(get_all_recommendations)
            .service(delete_recommendation)
    );
}
