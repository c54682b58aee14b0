//! Cart operations.

use sqlx::PgPool;

use driftwood_core::{ProductId, ShopperId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::{CartView, LineChange};

/// Errors that can occur while working with a cart.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The product being added does not exist.
    #[error("Invalid product specified")]
    ProductNotFound,

    /// The add quantity was below one.
    #[error("quantity must be a positive number")]
    InvalidAddQuantity,

    /// The shopper has no cart yet.
    #[error("Cart not found")]
    CartNotFound,

    /// The cart has no line for the product.
    #[error("Product not found in cart")]
    LineNotFound,

    /// Neither an action nor an explicit quantity was submitted.
    #[error("action or quantity is required")]
    MissingChange,

    /// The explicit quantity was negative.
    #[error("quantity must be zero or a positive number")]
    InvalidQuantity,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Interpret the PATCH body's `action`/`quantity` pair as a [`LineChange`].
///
/// `increase`/`decrease` adjust by one; any other action falls through to
/// the explicit quantity, which replaces the line's count (zero removes the
/// line). With neither, there is nothing to do.
pub fn parse_change(action: Option<&str>, quantity: Option<i64>) -> Result<LineChange, CartError> {
    match action {
        Some("increase") => Ok(LineChange::Increase),
        Some("decrease") => Ok(LineChange::Decrease),
        _ => match quantity {
            Some(q) if q >= 0 => {
                Ok(LineChange::Set(u32::try_from(q).map_err(|_| CartError::InvalidQuantity)?))
            }
            Some(_) => Err(CartError::InvalidQuantity),
            None => Err(CartError::MissingChange),
        },
    }
}

/// Service for cart reads and mutations.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Fetch a shopper's cart; a shopper with no cart gets the empty shape.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` failures via [`CartError::Repository`].
    pub async fn get(&self, shopper: &ShopperId) -> Result<CartView, CartError> {
        let view = self.carts.fetch_view(shopper).await?;
        Ok(view.unwrap_or_else(|| CartView::empty(shopper.clone())))
    }

    /// Add a product to the shopper's cart.
    ///
    /// Creates the cart lazily, snapshots the product's current name and
    /// price into the line, and merges a repeat add of the same product into
    /// the existing line instead of appending a second one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] for an unknown product,
    /// [`CartError::InvalidAddQuantity`] for a quantity below one.
    pub async fn add_item(
        &self,
        shopper: &ShopperId,
        product_id: ProductId,
        quantity: Option<i64>,
    ) -> Result<CartView, CartError> {
        let quantity = match quantity {
            None => 1,
            Some(q) if q >= 1 => u32::try_from(q).map_err(|_| CartError::InvalidAddQuantity)?,
            Some(_) => return Err(CartError::InvalidAddQuantity),
        };

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        let cart_id = self.carts.get_or_create(shopper).await?;
        self.carts
            .merge_line(cart_id, product.id, &product.name, product.price, quantity)
            .await?;

        self.get(shopper).await
    }

    /// Adjust or remove an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CartNotFound`] / [`CartError::LineNotFound`]
    /// when there is nothing to adjust.
    pub async fn update_item(
        &self,
        shopper: &ShopperId,
        product_id: ProductId,
        change: LineChange,
    ) -> Result<CartView, CartError> {
        let cart_id = self
            .carts
            .find(shopper)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let current = self
            .carts
            .line_quantity(cart_id, product_id)
            .await?
            .ok_or(CartError::LineNotFound)?;

        match change.resolve(current) {
            Some(quantity) => {
                self.carts
                    .set_line_quantity(cart_id, product_id, quantity)
                    .await?;
            }
            None => self.carts.remove_line(cart_id, product_id).await?,
        }

        self.get(shopper).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_and_decrease_actions() {
        assert_eq!(parse_change(Some("increase"), None).unwrap(), LineChange::Increase);
        assert_eq!(parse_change(Some("decrease"), None).unwrap(), LineChange::Decrease);
    }

    #[test]
    fn test_action_wins_over_quantity() {
        assert_eq!(
            parse_change(Some("increase"), Some(9)).unwrap(),
            LineChange::Increase
        );
    }

    #[test]
    fn test_explicit_quantity_replaces() {
        assert_eq!(parse_change(None, Some(4)).unwrap(), LineChange::Set(4));
        assert_eq!(parse_change(None, Some(0)).unwrap(), LineChange::Set(0));
    }

    #[test]
    fn test_unknown_action_falls_through_to_quantity() {
        assert_eq!(parse_change(Some("bump"), Some(2)).unwrap(), LineChange::Set(2));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        assert!(matches!(
            parse_change(None, Some(-1)),
            Err(CartError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_nothing_submitted() {
        assert!(matches!(parse_change(None, None), Err(CartError::MissingChange)));
        assert!(matches!(
            parse_change(Some("bump"), None),
            Err(CartError::MissingChange)
        ));
    }
}
