//! Cart repository.
//!
//! One cart row per shopper, created lazily by an atomic upsert the first
//! time something is added. Lines snapshot the product's name and price at
//! add time; the merge of a re-added product into its existing line is a
//! single `ON CONFLICT` statement rather than a read-modify-write.

use rust_decimal::Decimal;
use sqlx::PgPool;

use driftwood_core::{CartId, ProductId, ShopperId};

use super::RepositoryError;
use crate::models::{CartLine, CartView};

/// Internal row type for enriched cart lines.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: i32,
    name: String,
    price: Decimal,
    quantity: i32,
    images: Option<Vec<String>>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            quantity: u32::try_from(row.quantity).unwrap_or_default(),
            image: row
                .images
                .and_then(|images| images.into_iter().next()),
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the shopper's cart ID, creating the cart if it does not exist.
    ///
    /// Single round trip: the `ON CONFLICT` upsert makes concurrent first
    /// adds for the same shopper converge on one cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn get_or_create(&self, shopper: &ShopperId) -> Result<CartId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW() \
             RETURNING id",
        )
        .bind(shopper)
        .fetch_one(self.pool)
        .await?;

        Ok(CartId::new(id))
    }

    /// Find the shopper's cart ID without creating one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, shopper: &ShopperId) -> Result<Option<CartId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>("SELECT id FROM carts WHERE user_id = $1")
            .bind(shopper)
            .fetch_optional(self.pool)
            .await?;

        Ok(id.map(CartId::new))
    }

    /// Add a product to a cart, merging into an existing line.
    ///
    /// A line that already exists for the product gets `quantity` added to
    /// it; otherwise a new line is appended with the given name/price
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn merge_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        name: &str,
        price: Decimal,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, name, price, quantity) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(name)
        .bind(price)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        self.touch(cart_id).await
    }

    /// Current quantity of a line, if the line exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<u32>, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_items WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(quantity.map(|q| u32::try_from(q).unwrap_or_default()))
    }

    /// Replace a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn set_line_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.touch(cart_id).await
    }

    /// Remove a line from a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn remove_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.touch(cart_id).await
    }

    /// Fetch the shopper's enriched cart, or `None` if they have no cart.
    ///
    /// Lines come back in the order they were first added, each with the
    /// product's current primary image resolved (the price stays the
    /// snapshot taken at add time).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fetch_view(
        &self,
        shopper: &ShopperId,
    ) -> Result<Option<CartView>, RepositoryError> {
        let Some(cart_id) = self.find(shopper).await? else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT ci.product_id, ci.name, ci.price, ci.quantity, p.images \
             FROM cart_items ci \
             LEFT JOIN products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.added_at, ci.product_id",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        let lines = rows.into_iter().map(CartLine::from).collect();
        Ok(Some(CartView::new(shopper.clone(), lines)))
    }

    /// Bump the cart's `updated_at`.
    async fn touch(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
