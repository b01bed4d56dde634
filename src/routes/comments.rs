use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::routes::require_admin;
use crate::services::comment_service::CommentService;

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub publication_id: i32,
    pub content: String,
}

/// GET /comments/publication/{id} - Commentaires d'une publication,
/// du plus ancien au plus récent. Public.
#[get("/publication/{publication_id}")]
pub async fn get_publication_comments(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CommentService::list_by_publication(db.get_ref(), path.into_inner()).await {
        Ok(comments) => HttpResponse::Ok().json(comments),
        Err(e) => e.error_response(),
    }
}

/// POST /comments - L'auteur est l'utilisateur authentifié
#[post("")]
pub async fn create_comment(
    auth_user: AuthUser,
    body: web::Json<CreateCommentRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CommentService::create(
        db.get_ref(),
        auth_user.user_id,
        body.publication_id,
        &body.content,
    )
    .await
    {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => e.error_response(),
    }
}

/// DELETE /comments/{id} - Modération, réservé aux administrateurs
#[delete("/{id}")]
pub async fn delete_comment(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match CommentService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .service(get_publication_comments)
            .service(create_comment)
            .service(delete_comment)
    );
}
