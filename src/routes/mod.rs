pub mod health;
pub mod auth;
pub mod users;
pub mod publications;
pub mod comments;
pub mod messages;
pub mod notifications;
pub mod recommendations;
pub mod cart;
pub mod admin;

use actix_web::{web, HttpResponse};
use crate::middleware::AuthUser;

/// Garde d'accès admin: retourne la réponse 403 à renvoyer si
/// l'utilisateur authentifié n'est pas administrateur.
pub fn require_admin(auth_user: &AuthUser) -> Option<HttpResponse> {
    if auth_user.is_admin() {
        None
    } else {
        Some(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Accès réservé aux administrateurs"
        })))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(users::user_routes)
            .configure(publications::publication_routes)
            .configure(comments::comment_routes)
            .configure(messages::message_routes)
            .configure(notifications::notification_routes)
            .configure(recommendations::recommendation_routes)
            .configure(cart::cart_routes)
            .configure(admin::admin_routes)
    );
}
