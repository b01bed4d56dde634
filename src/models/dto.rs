//pour les réponses structurées
use serde::Serialize;
use super::{cart_items, carts};

// Panier + ses articles en une seule réponse
#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart: carts::Model,
    pub items: Vec<cart_items::Model>,
}

// Statistiques agrégées des recommandations
#[derive(Debug, Serialize)]
pub struct RecommendationStats {
    pub average: f64,
    pub total: u64,
}

// Résultat d'une suppression en masse de messages
#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
    pub deleted: usize,
    pub missing: Vec<i32>,
}
