pub mod error;
pub mod user_service;
pub mod publication_service;
pub mod auto_verification;
pub mod message_service;
pub mod notification_service;
pub mod recommendation_service;
pub mod comment_service;
pub mod cart_service;
