use actix_web::HttpResponse;
use sea_orm::DbErr;
use thiserror::Error;

/// Erreurs métier des services, mappées sur un statut HTTP au niveau des routes.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// L'entité référencée n'existe pas (404)
    #[error("{0}")]
    NotFound(String),

    /// Entrée malformée, manquante ou hors bornes (400)
    #[error("{0}")]
    Validation(String),

    /// Entrée valide mais opération interdite par une règle métier (400)
    #[error("{0}")]
    Policy(String),

    /// Violation d'unicité (email ou recommandation en double) (409)
    #[error("{0}")]
    Conflict(String),

    /// Erreur de la couche de persistance (500)
    #[error("Erreur base de données: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Traduit l'erreur en réponse HTTP JSON. Le détail des erreurs de
    /// persistance reste dans les journaux, jamais dans le corps renvoyé.
    pub fn error_response(&self) -> HttpResponse {
        let body = serde_json::json!({ "error": self.to_string() });
        match self {
            Self::NotFound(_) => HttpResponse::NotFound().json(body),
            Self::Validation(_) | Self::Policy(_) => HttpResponse::BadRequest().json(body),
            Self::Conflict(_) => HttpResponse::Conflict().json(body),
            Self::Database(e) => {
                eprintln!("❌ Erreur base de données: {}", e);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "error": "Erreur interne du serveur" }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::not_found("x").error_response().status(),
            actix_web::http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::validation("x").error_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::policy("x").error_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::conflict("x").error_response().status(),
            actix_web::http::StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_database_error_body_stays_generic() {
        let error = ServiceError::Database(DbErr::Custom(
            "connexion refusée pour l'utilisateur postgres".to_string(),
        ));
        let response = error.error_response();

        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body = String::from_utf8_lossy(&bytes);
        assert!(!body.contains("postgres"));
        assert!(body.contains("Erreur interne du serveur"));
    }
}
