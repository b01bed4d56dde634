mod models;
mod routes;
mod db;
mod services;
mod utils;
mod middleware;

use std::env;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use sea_orm::DatabaseConnection;

use services::auto_verification::{AutoVerificationService, SWEEP_INTERVAL_SECS};

/// Tâche de fond: vérification automatique des publications en attente
/// depuis plus de 24 heures, exécutée toutes les heures.
fn spawn_auto_verification(db: web::Data<DatabaseConnection>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match AutoVerificationService::process_pending(db.get_ref()).await {
                Ok(0) => {}
                Ok(count) => {
                    println!("✅ Vérification automatique: {} publication(s) approuvée(s)", count)
                }
                Err(e) => eprintln!("❌ Erreur lors de la vérification automatique: {}", e),
            }
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = web::Data::new(
        db::establish_connection()
            .await
            .expect("Failed to connect to database"),
    );
    println!("✅ Database connected!");

    spawn_auto_verification(db.clone());

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    println!("🚀 Starting server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .configure(routes::configure_routes)
    })
    .bind((host, port))?
    .run()
    .await
}
