use actix_web::{get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::services::notification_service::NotificationService;

fn own_or_admin(auth_user: &AuthUser, user_id: i32) -> Option<HttpResponse> {
    if auth_user.user_id != user_id && !auth_user.is_admin() {
        return Some(HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Accès refusé aux notifications de cet utilisateur"
        })));
    }
    None
}

/// GET /notifications/user/{id} - Toutes les notifications, les plus
/// récentes d'abord. Une erreur de lecture donne une liste vide.
#[get("/user/{user_id}")]
pub async fn get_notifications(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if let Some(forbidden) = own_or_admin(&auth_user, user_id) {
        return forbidden;
    }
    HttpResponse::Ok().json(NotificationService::list(db.get_ref(), user_id).await)
}

/// GET /notifications/user/{id}/unread
#[get("/user/{user_id}/unread")]
pub async fn get_unread_notifications(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if let Some(forbidden) = own_or_admin(&auth_user, user_id) {
        return forbidden;
    }
    HttpResponse::Ok().json(NotificationService::list_unread(db.get_ref(), user_id).await)
}

/// GET /notifications/user/{id}/unread-count - Compteur pour le badge
#[get("/user/{user_id}/unread-count")]
pub async fn count_unread_notifications(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if let Some(forbidden) = own_or_admin(&auth_user, user_id) {
        return forbidden;
    }
    let count = NotificationService::count_unread(db.get_ref(), user_id).await;
    HttpResponse::Ok().json(serde_json::json!({ "count": count }))
}

/// PUT /notifications/{id}/read - Réservé au destinataire (ou à un admin)
#[put("/{id}/read")]
pub async fn mark_notification_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let notification_id = path.into_inner();
    let notification = match NotificationService::find_by_id(db.get_ref(), notification_id).await {
        Ok(Some(notification)) => notification,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Notification non trouvée"
            }));
        }
        Err(e) => return e.error_response(),
    };
    if let Some(forbidden) = own_or_admin(&auth_user, notification.user_id) {
        return forbidden;
    }
    match NotificationService::mark_read(db.get_ref(), notification_id).await {
        Ok(notification) => HttpResponse::Ok().json(notification),
        Err(e) => e.error_response(),
    }
}

/// PUT /notifications/user/{id}/read-all
#[put("/user/{user_id}/read-all")]
pub async fn mark_all_notifications_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if let Some(forbidden) = own_or_admin(&auth_user, user_id) {
        return forbidden;
    }
    match NotificationService::mark_all_read(db.get_ref(), user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::models::notifications;
    use crate::utils::jwt;

    fn sample_notification(user_id: i32, is_read: bool) -> notifications::Model {
        notifications::Model {
            id: 5,
            user_id,
            message: "Votre publication a été approuvée".to_string(),
            is_read,
            notification_type: "PUBLICATION_APPROVED".to_string(),
            publication_id: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[actix_web::test]
    async fn test_mark_read_rejects_foreign_notification() {
        // La notification appartient à l'utilisateur 2, le token est celui de 1
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_notification(2, false)]])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(mark_notification_read),
        )
        .await;

        let token = jwt::generate_token(1, "user@example.com", "USER").unwrap();
        let req = test::TestRequest::put()
            .uri("/5/read")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_mark_read_allows_recipient() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_notification(1, false)]])
            // Côté service: relecture puis mise à jour
            .append_query_results([vec![sample_notification(1, false)]])
            .append_query_results([vec![sample_notification(1, true)]])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .service(mark_notification_read),
        )
        .await;

        let token = jwt::generate_token(1, "user@example.com", "USER").unwrap();
        let req = test::TestRequest::put()
            .uri("/5/read")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }
}

pub fn notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .service(count_unread_notifications)
            .service(get_unread_notifications)
            .service(mark_all_notifications_read)
            .service(get_notifications)
            .service(mark_notification_read)
    );
}
