use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::services::cart_service::CartService;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub publication_id: i32,
    pub quantity: i32,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// GET /cart - Panier de l'utilisateur authentifié (créé à la volée)
#[get("")]
pub async fn get_cart(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    match CartService::get_view(db.get_ref(), auth_user.user_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.error_response(),
    }
}

/// POST /cart/items - Ajoute une publication au panier. Si elle y est
/// déjà, les quantités s'additionnent.
#[post("/items")]
pub async fn add_cart_item(
    auth_user: AuthUser,
    body: web::Json<AddItemRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CartService::add_item(db.get_ref(), auth_user.user_id, body.publication_id, body.quantity)
        .await
    {
        Ok(item) => HttpResponse::Ok().json(item),
        Err(e) => e.error_response(),
    }
}

/// PUT /cart/items/{id} - Met à jour la quantité d'une ligne du panier
#[put("/items/{id}")]
pub async fn update_cart_item(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateQuantityRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CartService::update_quantity(
        db.get_ref(),
        auth_user.user_id,
        path.into_inner(),
        body.quantity,
    )
    .await
    {
        Ok(item) => HttpResponse::Ok().json(item),
        Err(e) => e.error_response(),
    }
}

/// DELETE /cart/items/{id}
#[delete("/items/{id}")]
pub async fn remove_cart_item(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    match CartService::remove_item(db.get_ref(), auth_user.user_id, path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

/// DELETE /cart - Vide le panier
#[delete("")]
pub async fn clear_cart(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    match CartService::clear(db.get_ref(), auth_user.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => e.error_response(),
    }
}

pub fn cart_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .service(add_cart_item)
            .service(update_cart_item)
            .service(remove_cart_item)
            .service(get_cart)
            .service(clear_cart)
    );
}
