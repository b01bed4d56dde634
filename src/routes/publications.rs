use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::services::publication_service::PublicationService;

// DTO de création d'une publication. Aucun drapeau de modération n'est
// accepté du client: toute nouvelle publication démarre non vérifiée.
#[derive(Deserialize, Validate)]
pub struct CreatePublicationRequest {
    #[validate(length(min = 1, message = "Le titre ne peut pas être vide"))]
    pub title: String,
    #[validate(length(min = 1, message = "La description ne peut pas être vide"))]
    pub description: String,
    #[validate(length(min = 1, message = "Le type ne peut pas être vide"))]
    pub publication_type: String,
    #[validate(range(min = 0.01, message = "Le prix doit être positif"))]
    pub price: f64,
    pub status: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
}

/// GET /publications/catalog - Publications du catalogue (PUBLIC)
#[get("/catalog")]
pub async fn get_catalog(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match PublicationService::get_catalog(db.get_ref()).await {
        Ok(publications) => HttpResponse::Ok().json(publications),
        Err(e) => e.error_response(),
    }
}

/// GET /publications/page - Publications de la page /publications (PUBLIC)
#[get("/page")]
pub async fn get_publications_page(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match PublicationService::get_publications_page(db.get_ref()).await {
        Ok(publications) => HttpResponse::Ok().json(publications),
        Err(e) => e.error_response(),
    }
}

/// GET /publications/user/{id} - Publications d'un utilisateur (PROTÉGÉE)
#[get("/user/{user_id}")]
pub async fn get_user_publications(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match PublicationService::find_by_user(db.get_ref(), path.into_inner()).await {
        Ok(publications) => HttpResponse::Ok().json(publications),
        Err(e) => e.error_response(),
    }
}

/// GET /publications/{id} - Détail d'une publication (PUBLIC)
/// Une publication non vérifiée n'est visible que par un admin.
#[get("/{id}")]
pub async fn get_publication(
    auth_user: Option<AuthUser>,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let publication = match PublicationService::find_by_id(db.get_ref(), path.into_inner()).await {
        Ok(Some(publication)) => publication,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Publication non trouvée"
            }));
        }
        Err(e) => return e.error_response(),
    };

    let is_admin = auth_user.map(|u| u.is_admin()).unwrap_or(false);
    if !publication.verified && !is_admin {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "Publication non trouvée"
        }));
    }

    HttpResponse::Ok().json(publication)
}

/// POST /publications - Créer une publication (PROTÉGÉE)
#[post("")]
pub async fn create_publication(
    auth_user: AuthUser,
    body: web::Json<CreatePublicationRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Erreur de validation: {}", e)
        }));
    }

    let file = match (&body.file_url, &body.file_name, &body.file_type, body.file_size) {
        (Some(url), name, mime, size) => Some((
            url.clone(),
            name.clone().unwrap_or_default(),
            mime.clone().unwrap_or_default(),
            size.unwrap_or(0),
        )),
        _ => None,
    };

    match PublicationService::create(
        db.get_ref(),
        &body.title,
        &body.description,
        &body.publication_type,
        body.price,
        body.status.as_deref(),
        file,
        Some(auth_user.user_id),
    )
    .await
    {
        Ok(publication) => HttpResponse::Created().json(publication),
        Err(e) => e.error_response(),
    }
}

pub fn publication_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/publications")
            .service(get_catalog)
            .service(get_publications_page)
            .service(get_user_publications)
            .service(create_publication)
            .service(get_publication)
    );
}
