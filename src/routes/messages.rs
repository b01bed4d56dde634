use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::routes::require_admin;
use crate::services::message_service::{sort_conversation, MessageService};
use crate::services::user_service::UserService;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: Option<i32>,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i32>,
}

/// POST /messages - Envoi d'un message direct.
/// L'expéditeur est l'utilisateur authentifié.
#[post("")]
pub async fn send_message(
    auth_user: AuthUser,
    body: web::Json<SendMessageRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let body = body.into_inner();
    let file = body.file_url.map(|url| (url, body.file_name, body.file_type));
    let location = match (body.latitude, body.longitude) {
        (Some(lat), Some(lon)) => Some((lat, lon, body.location_name)),
        _ => None,
    };

    match MessageService::send(
        db.get_ref(),
        Some(auth_user.user_id),
        body.receiver_id,
        body.content.as_deref(),
        file,
        location,
    )
    .await
    {
        Ok(message) => HttpResponse::Ok().json(message),
        Err(e) => e.error_response(),
    }
}

/// GET /messages/conversation/{a}/{b} - Conversation entre deux
/// utilisateurs, accessible aux participants et aux administrateurs
#[get("/conversation/{user_a}/{user_b}")]
pub async fn get_conversation(
    auth_user: AuthUser,
    path: web::Path<(i32, i32)>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let (user_a, user_b) = path.into_inner();
    if auth_user.user_id != user_a && auth_user.user_id != user_b && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Accès refusé à cette conversation"
        }));
    }
    match MessageService::get_conversation(db.get_ref(), user_a, user_b).await {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => e.error_response(),
    }
}

/// GET /messages/user/{id} - Messages envoyés et reçus par un
/// utilisateur, fusionnés et triés par date croissante
#[get("/user/{user_id}")]
pub async fn get_user_messages(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if auth_user.user_id != user_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Accès refusé aux messages de cet utilisateur"
        }));
    }

    let sent = MessageService::find_by_sender(db.get_ref(), user_id).await;
    let received = MessageService::find_by_receiver(db.get_ref(), user_id).await;
    match (sent, received) {
        (Ok(mut sent), Ok(received)) => {
            sent.extend(received);
            HttpResponse::Ok().json(sort_conversation(sent))
        }
        (Err(e), _) | (_, Err(e)) => e.error_response(),
    }
}

/// GET /messages/admin-id - ID du compte administrateur, pour que les
/// utilisateurs puissent ouvrir une conversation avec le support
#[get("/admin-id")]
pub async fn get_admin_id(_auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    match UserService::find_admin(db.get_ref()).await {
        Ok(Some(admin)) => HttpResponse::Ok().json(serde_json::json!({ "admin_id": admin.id })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Aucun administrateur trouvé"
        })),
        Err(e) => e.error_response(),
    }
}

/// GET /messages/admin/conversations - Tous les messages (vue admin)
#[get("/admin/conversations")]
pub async fn get_all_messages(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match MessageService::get_all(db.get_ref()).await {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => e.error_response(),
    }
}

/// GET /messages/admin/users - Interlocuteurs possibles pour l'admin
#[get("/admin/users")]
pub async fn get_message_users(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match UserService::get_all_non_admin(db.get_ref()).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => e.error_response(),
    }
}

/// DELETE /messages/bulk - Suppression en lot, best-effort: les IDs
/// introuvables sont rapportés sans faire échouer le reste
#[delete("/bulk")]
pub async fn delete_messages_bulk(
    auth_user: AuthUser,
    body: web::Json<BulkDeleteRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match MessageService::delete_bulk(db.get_ref(), &body.ids).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => e.error_response(),
    }
}

/// DELETE /messages/{id}
#[delete("/{id}")]
pub async fn delete_message(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Some(forbidden) = require_admin(&auth_user) {
        return forbidden;
    }
    match MessageService::delete(db.get_ref(), path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

/// PUT /messages/{id}/read - Marque un message comme lu (idempotent).
/// Seul le destinataire (ou un admin) peut poser le statut de lecture.
#[put("/{id}/read")]
pub async fn mark_message_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let message_id = path.into_inner();
    let message = match MessageService::find_by_id(db.get_ref(), message_id).await {
        Ok(Some(message)) => message,
        // Message absent: no-op, pas une erreur
        Ok(None) => return HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => return e.error_response(),
    };
    if auth_user.user_id != message.receiver_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Seul le destinataire peut marquer ce message comme lu"
        }));
    }
    match MessageService::mark_read(db.get_ref(), message_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

/// PUT /messages/user/{id}/read-all - Marque tous les messages reçus comme lus
#[put("/user/{user_id}/read-all")]
pub async fn mark_all_messages_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if auth_user.user_id != user_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Accès refusé aux messages de cet utilisateur"
        }));
    }
    match MessageService::mark_all_read(db.get_ref(), user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

/// GET /messages/user/{id}/unread-count
#[get("/user/{user_id}/unread-count")]
pub async fn count_unread_messages(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if auth_user.user_id != user_id && !auth_user.is_admin() {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Accès refusé aux messages de cet utilisateur"
        }));
    }
    match MessageService::count_unread(db.get_ref(), user_id).await {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({ "count": count })),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::models::messages;
    use crate::utils::jwt;

    fn sample_message(receiver_id: i32) -> messages::Model {
        messages::Model {
            id: 9,
            content: Some("Bonjour".to_string()),
            sender_id: 3,
            receiver_id,
            is_read: false,
            file_url: None,
            file_name: None,
            file_type: None,
            latitude: None,
            longitude: None,
            location_name: None,
            created_at: Some(chrono::Utc::now().naive_utc()),
            updated_at: Some(chrono::Utc::now().naive_utc()),
        }
    }

    #[actix_web::test]
    async fn test_mark_read_rejects_non_recipient() {
        // Message adressé à l'utilisateur 2, token de l'utilisateur 1
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_message(2)]])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(mark_message_read),
        )
        .await;

        let token = jwt::generate_token(1, "user@example.com", "USER").unwrap();
        let req = test::TestRequest::put()
            .uri("/9/read")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_mark_read_missing_message_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<messages::Model>::new()])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(mark_message_read),
        )
        .await;

        let token = jwt::generate_token(1, "user@example.com", "USER").unwrap();
        let req = test::TestRequest::put()
            .uri("/9/read")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }
}

pub fn message_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/messages")
            .service(get_conversation)
            .service(get_admin_id)
            .service(get_all_messages)
            .service(get_message_users)
            .service(count_unread_messages)
            .service(mark_all_messages_read)
            .service(get_user_messages)
            .service(delete_messages_bulk)
            .service(mark_message_read)
            .service(delete_message)
            .service(send_message)
    );
}
