use sea_orm::*;
use chrono::{Duration, Utc};
use crate::models::publications;
use crate::services::error::ServiceError;

/// Intervalle entre deux passages du balayage (une heure)
pub const SWEEP_INTERVAL_SECS: u64 = 3600;

/// Délai au-delà duquel une publication en attente est vérifiée d'office
const PENDING_HOURS: i64 = 24;

pub struct AutoVerificationService;

impl AutoVerificationService {
    /// Balayage périodique: toute publication non vérifiée depuis plus de
    /// 24 heures est auto-vérifiée (verified_by = None, comme la
    /// vérification implicite lors d'un changement de drapeau).
    pub async fn process_pending(db: &DatabaseConnection) -> Result<usize, ServiceError> {
        let cutoff = Utc::now().naive_utc() - Duration::hours(PENDING_HOURS);

        let pending = publications::Entity::find()
            .filter(publications::Column::Verified.eq(false))
            .filter(publications::Column::CreatedAt.lt(cutoff))
            .all(db)
            .await?;

        let mut verified_count = 0;
        for publication in pending {
            let id = publication.id;
            match Self::auto_verify(db, publication).await {
                Ok(()) => verified_count += 1,
                Err(e) => {
                    // Le balayage continue: la publication sera retentée au prochain passage
                    eprintln!(
                        "⚠️ Erreur lors de la vérification automatique de la publication {}: {}",
                        id, e
                    );
                }
            }
        }

        if verified_count > 0 {
            println!("✅ {} publication(s) vérifiée(s) automatiquement", verified_count);
        }

        Ok(verified_count)
    }

    async fn auto_verify(
        db: &DatabaseConnection,
        publication: publications::Model,
    ) -> Result<(), ServiceError> {
        let mut active: publications::ActiveModel = publication.into();
        active.verified = Set(true);
        active.verified_by = Set(None);
        active.verified_at = Set(Some(Utc::now().naive_utc()));
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_publication(id: i32, hours_old: i64) -> publications::Model {
        let created = Utc::now().naive_utc() - Duration::hours(hours_old);
        publications::Model {
            id,
            title: format!("Publication {}", id),
            description: "Description".to_string(),
            publication_type: "VENTE".to_string(),
            price: 10.0,
            status: "DISPONIBLE".to_string(),
            verified: false,
            in_catalog: false,
            in_publications: false,
            verified_by: None,
            verified_at: None,
            file_url: None,
            file_name: None,
            file_type: None,
            file_size: None,
            user_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    async fn test_sweep_verifies_pending_publications() {
        let stale = pending_publication(1, 48);
        let mut after = stale.clone();
        after.verified = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stale]])
            .append_query_results([vec![after]])
            .into_connection();

        let verified = AutoVerificationService::process_pending(&db).await.unwrap();

        assert_eq!(verified, 1);
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<publications::Model>::new()])
            .into_connection();

        let verified = AutoVerificationService::process_pending(&db).await.unwrap();

        assert_eq!(verified, 0);
    }
}
