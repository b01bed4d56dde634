// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - users : Utilisateurs (rôles USER/ADMIN, profil, présence en ligne)
//   - publications : Annonces avec drapeaux de modération et de visibilité
//   - comments : Commentaires attachés aux publications
//   - messages : Messages directs entre utilisateurs
//   - notifications : Notifications par utilisateur (boîte de réception)
//   - recommendations : Note de satisfaction (0-10), une par utilisateur
//   - carts / cart_items : Panier et ses articles
//   - dto : Data Transfer Objects pour les réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les timestamps sont posés explicitement par les services
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod users;
pub mod publications;
pub mod comments;
pub mod messages;
pub mod notifications;
pub mod recommendations;
pub mod carts;
pub mod cart_items;
pub mod dto;
