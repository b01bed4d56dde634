use sea_orm::*;
use chrono::Utc;
use crate::models::dto::CartView;
use crate::models::{cart_items, carts, publications, users};
use crate::services::error::ServiceError;

pub struct CartService;

impl CartService {
    /// Le panier de l'utilisateur, créé à la volée s'il n'existe pas encore
    pub async fn get_or_create(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<carts::Model, ServiceError> {
        let existing = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(db)
            .await?;

        if let Some(cart) = existing {
            return Ok(cart);
        }

        let user = users::Entity::find_by_id(user_id).one(db).await?;
        if user.is_none() {
            return Err(ServiceError::not_found("Utilisateur non trouvé"));
        }

        let now = Utc::now().naive_utc();
        let cart = carts::ActiveModel {
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(cart.insert(db).await?)
    }

    /// Panier + articles, toujours relu depuis la base
    pub async fn get_view(db: &DatabaseConnection, user_id: i32) -> Result<CartView, ServiceError> {
        let cart = Self::get_or_create(db, user_id).await?;
        let items = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(CartView { cart, items })
    }

    /// Ajoute un article. Si la publication est déjà dans le panier, les
    /// quantités se cumulent au lieu de créer un doublon.
    pub async fn add_item(
        db: &DatabaseConnection,
        user_id: i32,
        publication_id: i32,
        quantity: i32,
    ) -> Result<cart_items::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::validation("La quantité doit être supérieure à 0"));
        }

        let cart = Self::get_or_create(db, user_id).await?;

        let publication = publications::Entity::find_by_id(publication_id).one(db).await?;
        if publication.is_none() {
            return Err(ServiceError::not_found("Publication non trouvée"));
        }

        let existing = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .filter(cart_items::Column::PublicationId.eq(publication_id))
            .one(db)
            .await?;

        match existing {
            Some(item) => {
                let new_quantity = item.quantity + quantity;
                let mut active: cart_items::ActiveModel = item.into();
                active.quantity = Set(new_quantity);
                Ok(active.update(db).await?)
            }
            None => {
                let item = cart_items::ActiveModel {
                    cart_id: Set(cart.id),
                    publication_id: Set(publication_id),
                    quantity: Set(quantity),
                    created_at: Set(Utc::now().naive_utc()),
                    ..Default::default()
                };
                Ok(item.insert(db).await?)
            }
        }
    }

    pub async fn update_quantity(
        db: &DatabaseConnection,
        user_id: i32,
        cart_item_id: i32,
        quantity: i32,
    ) -> Result<cart_items::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::validation("La quantité doit être supérieure à 0"));
        }

        let item = Self::fetch_owned_item(db, user_id, cart_item_id).await?;
        let mut active: cart_items::ActiveModel = item.into();
        active.quantity = Set(quantity);
        Ok(active.update(db).await?)
    }

    pub async fn remove_item(
        db: &DatabaseConnection,
        user_id: i32,
        cart_item_id: i32,
    ) -> Result<(), ServiceError> {
        let item = Self::fetch_owned_item(db, user_id, cart_item_id).await?;
        let active: cart_items::ActiveModel = item.into();
        active.delete(db).await?;
        Ok(())
    }

    pub async fn clear(db: &DatabaseConnection, user_id: i32) -> Result<(), ServiceError> {
        let cart = Self::get_or_create(db, user_id).await?;
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Récupère un article et vérifie qu'il appartient bien au panier de
    /// l'utilisateur demandeur.
    async fn fetch_owned_item(
        db: &DatabaseConnection,
        user_id: i32,
        cart_item_id: i32,
    ) -> Result<cart_items::Model, ServiceError> {
        let item = cart_items::Entity::find_by_id(cart_item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!(
                    "Article du panier non trouvé avec l'ID: {}",
                    cart_item_id
                ))
            })?;

        let cart = carts::Entity::find_by_id(item.cart_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Panier non trouvé"))?;

        if cart.user_id != user_id {
            return Err(ServiceError::policy(
                "Cet article appartient au panier d'un autre utilisateur",
            ));
        }

        Ok(item)
    }
}
