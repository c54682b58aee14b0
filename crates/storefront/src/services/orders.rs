//! Order placement.
//!
//! The flow with the most invariants in the codebase: validate the
//! submitted lines, resolve a shipping snapshot, then - inside a single
//! database transaction - check every line against live stock under row
//! locks, decrement, and persist the order. Dropping the transaction on any
//! failure rolls back every decrement made for earlier lines, so an order
//! either commits whole or leaves stock untouched.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use driftwood_core::{AddressId, OrderNumber, ProductId, ShopperId, money};

use crate::db::{
    AddressRepository, OrderRepository, ProductRepository, RepositoryError,
};
use crate::models::{
    NewOrderLine, Order, ShippingDetails, ShippingError, ShippingForm,
};

/// Errors that can occur while placing or reading orders.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The request carried no items.
    #[error("At least one product item is required")]
    EmptyItems,

    /// An item was submitted without a product ID.
    #[error("Each item must include productId")]
    MissingProductId,

    /// An item quantity was below one.
    #[error("Item quantity must be a positive number")]
    InvalidQuantity,

    /// A referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A line asked for more units than the product has in stock.
    #[error("Only {available} left for {name}")]
    InsufficientStock { name: String, available: u32 },

    /// The referenced saved address does not exist or belongs to someone else.
    #[error("Address not found for this user")]
    AddressNotFound,

    /// Neither a saved address nor inline shipping details were provided.
    #[error("Shipping details are required")]
    ShippingRequired,

    /// Inline shipping details failed validation.
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One submitted order line, exactly as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
}

/// A validated order line request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Where the shipping snapshot for an order comes from.
///
/// A saved address always wins over inline details when both are submitted.
#[derive(Debug, Clone)]
pub enum ShippingSource {
    /// A saved address, ownership-checked against the shopper.
    Saved(AddressId),
    /// Inline shipping details from the request body.
    Inline(ShippingForm),
    /// Neither was provided.
    Missing,
}

impl ShippingSource {
    /// Pick the shipping source from the request fields.
    #[must_use]
    pub fn from_request(address_id: Option<AddressId>, shipping: Option<ShippingForm>) -> Self {
        match (address_id, shipping) {
            (Some(id), _) => Self::Saved(id),
            (None, Some(form)) => Self::Inline(form),
            (None, None) => Self::Missing,
        }
    }
}

/// Validate submitted lines, in submission order.
///
/// A missing quantity defaults to 1; an explicit quantity below 1 is
/// rejected. Line order is preserved - stock is later checked and
/// decremented in exactly this order.
pub fn validate_lines(items: &[OrderItemInput]) -> Result<Vec<LineRequest>, OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyItems);
    }

    items
        .iter()
        .map(|item| {
            let product_id = item.product_id.ok_or(OrderError::MissingProductId)?;
            let quantity = match item.quantity {
                None => 1,
                Some(q) if q >= 1 => u32::try_from(q).map_err(|_| OrderError::InvalidQuantity)?,
                Some(_) => return Err(OrderError::InvalidQuantity),
            };
            Ok(LineRequest {
                product_id,
                quantity,
            })
        })
        .collect()
}

/// Generate a fresh order number from the clock and a random suffix.
///
/// Effectively unique, not guaranteed: the unique constraint on
/// `orders.order_number` is the backstop and a collision surfaces as a
/// conflict without a retry.
#[must_use]
pub fn generate_order_number() -> OrderNumber {
    use rand::Rng;

    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    let suffix = rand::rng().random_range(0..1_000_000u32);
    OrderNumber::from_parts(millis, suffix)
}

/// Service for placing and reading orders.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    addresses: AddressRepository<'a>,
    products: ProductRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            addresses: AddressRepository::new(pool),
            products: ProductRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order.
    ///
    /// All stock checks, decrements, and the order insert run in one
    /// transaction; a failure on the third line of a three-line order rolls
    /// back the decrements already made for the first two.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] naming the first failing line or shipping
    /// problem; repository failures pass through.
    pub async fn place(
        &self,
        shopper: &ShopperId,
        shipping_source: ShippingSource,
        items: &[OrderItemInput],
    ) -> Result<Order, OrderError> {
        let lines = validate_lines(items)?;
        let shipping = self.resolve_shipping(shopper, shipping_source).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut order_lines: Vec<NewOrderLine> = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;

        for line in &lines {
            let product = self
                .products
                .lock_for_order(&mut tx, line.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(line.product_id))?;

            if let Some(available) = product.tracked_stock()
                && available < line.quantity
            {
                return Err(OrderError::InsufficientStock {
                    name: product.name,
                    available,
                });
            }

            let subtotal = money::line_subtotal(product.price, line.quantity);
            total += subtotal;

            order_lines.push(NewOrderLine {
                product_id: line.product_id,
                name: product.name.clone(),
                price: product.price,
                quantity: line.quantity,
                subtotal,
            });

            if product.stock.is_some() {
                self.products
                    .decrement_stock(&mut tx, line.product_id, line.quantity)
                    .await?;
            }
        }

        let order_number = generate_order_number();
        let order = self
            .orders
            .insert(&mut tx, shopper, &order_number, &order_lines, &shipping, total)
            .await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_number = %order.order_number,
            user_id = %order.user_id,
            lines = order.items.len(),
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }

    /// Resolve the shipping snapshot for an order.
    async fn resolve_shipping(
        &self,
        shopper: &ShopperId,
        source: ShippingSource,
    ) -> Result<ShippingDetails, OrderError> {
        match source {
            ShippingSource::Saved(id) => self
                .addresses
                .find_owned(shopper, id)
                .await?
                .map(ShippingDetails::from)
                .ok_or(OrderError::AddressNotFound),
            ShippingSource::Inline(form) => Ok(ShippingDetails::try_from_form(&form)?),
            ShippingSource::Missing => Err(OrderError::ShippingRequired),
        }
    }

    /// Get an order by ID, optionally scoped to a shopper.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` failures via [`OrderError::Repository`].
    pub async fn get(
        &self,
        id: driftwood_core::OrderId,
        scope: Option<&ShopperId>,
    ) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.get(id, scope).await?)
    }

    /// List a shopper's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` failures via [`OrderError::Repository`].
    pub async fn list(&self, shopper: &ShopperId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_for_shopper(shopper).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(product_id: Option<i32>, quantity: Option<i64>) -> OrderItemInput {
        OrderItemInput {
            product_id: product_id.map(ProductId::new),
            quantity,
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(matches!(validate_lines(&[]), Err(OrderError::EmptyItems)));
    }

    #[test]
    fn test_missing_product_id_rejected() {
        let err = validate_lines(&[item(None, Some(1))]).unwrap_err();
        assert_eq!(err.to_string(), "Each item must include productId");
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let lines = validate_lines(&[item(Some(3), None)]).unwrap();
        assert_eq!(lines, vec![LineRequest { product_id: ProductId::new(3), quantity: 1 }]);
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        assert!(matches!(
            validate_lines(&[item(Some(3), Some(0))]),
            Err(OrderError::InvalidQuantity)
        ));
        assert!(matches!(
            validate_lines(&[item(Some(3), Some(-2))]),
            Err(OrderError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_submission_order_is_preserved() {
        let lines =
            validate_lines(&[item(Some(9), Some(2)), item(Some(4), Some(1))]).unwrap();
        let ids: Vec<i32> = lines.iter().map(|l| l.product_id.as_i32()).collect();
        assert_eq!(ids, vec![9, 4]);
    }

    #[test]
    fn test_first_invalid_line_wins() {
        // Validation stops at the first bad line, like the per-line loop.
        let err = validate_lines(&[
            item(Some(1), Some(1)),
            item(None, Some(1)),
            item(Some(2), Some(0)),
        ])
        .unwrap_err();
        assert!(matches!(err, OrderError::MissingProductId));
    }

    #[test]
    fn test_saved_address_wins_over_inline() {
        let source =
            ShippingSource::from_request(Some(AddressId::new(5)), Some(ShippingForm::default()));
        assert!(matches!(source, ShippingSource::Saved(id) if id == AddressId::new(5)));
    }

    #[test]
    fn test_inline_used_without_address_id() {
        let source = ShippingSource::from_request(None, Some(ShippingForm::default()));
        assert!(matches!(source, ShippingSource::Inline(_)));
    }

    #[test]
    fn test_neither_source_is_missing() {
        assert!(matches!(
            ShippingSource::from_request(None, None),
            ShippingSource::Missing
        ));
    }

    #[test]
    fn test_generated_order_numbers_parse_and_differ() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(OrderNumber::parse(a.as_str()).is_ok());
        // Same millisecond is possible; identical suffixes too - but both at
        // once is vanishingly unlikely. A flaky failure here would indicate
        // the RNG is not being advanced.
        assert_ne!(a, b);
    }

    #[test]
    fn test_insufficient_stock_message_names_remaining_count() {
        let err = OrderError::InsufficientStock {
            name: "Oak Shelf".to_owned(),
            available: 5,
        };
        assert_eq!(err.to_string(), "Only 5 left for Oak Shelf");
    }
}
