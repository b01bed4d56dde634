use actix_web::{post, get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::services::user_service::UserService;
use crate::utils::{password, jwt};

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    pub username: Option<String>,
    #[validate(email(message = "Email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit faire au moins 6 caractères"))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après login/register
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
    pub role: String,
    pub username: Option<String>,
}

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Erreur de validation: {}", e)
        }));
    }

    // Le rôle n'est jamais fourni par le client: toujours USER à l'inscription
    let user = match UserService::create_account(
        db.get_ref(),
        &body.email,
        &body.password,
        body.username.as_deref(),
        None,
    )
    .await
    {
        Ok(user) => user,
        Err(e) => return e.error_response(),
    };

    let token = match jwt::generate_token(user.id, &user.email, &user.role) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        role: user.role,
        username: user.username,
    })
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver l'utilisateur (email insensible à la casse)
    let user = match UserService::find_by_email(db.get_ref(), &body.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Email ou mot de passe incorrect"
            }));
        }
        Err(e) => return e.error_response(),
    };

    // 2. Vérifier le mot de passe
    let password_hash = match user.password {
        Some(ref hash) => hash,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Email ou mot de passe incorrect"
            }));
        }
    };

    let is_valid = match password::verify_password(&body.password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Password verification error: {}", e)
            }));
        }
    };

    if !is_valid {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Email ou mot de passe incorrect"
        }));
    }

    // 3. Mettre à jour le statut de présence (is_online + last_login)
    if let Err(e) = UserService::set_online(db.get_ref(), user.id, true).await {
        eprintln!("⚠️ Erreur lors de la mise à jour du statut de connexion: {}", e);
    }

    // 4. Générer le JWT
    let token = match jwt::generate_token(user.id, &user.email, &user.role) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
        email: user.email,
        role: user.role,
        username: user.username,
    })
}

/// POST /auth/logout - Se déconnecter (PROTÉGÉE)
#[post("/logout")]
pub async fn logout(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> HttpResponse {
    if let Err(e) = UserService::set_online(db.get_ref(), auth_user.user_id, false).await {
        return e.error_response();
    }

    HttpResponse::Ok().json(serde_json::json!({
        "success": true
    }))
}

/// GET /auth/me - Vérifier le token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth_user)
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(logout)
            .service(me)
    );
}
