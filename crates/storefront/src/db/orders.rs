//! Order repository.
//!
//! Order rows and their line snapshots are written inside the caller's
//! transaction (see `services::orders`), so a failure on any line rolls
//! back the stock decrements made earlier in the same request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use driftwood_core::{
    Email, OrderId, OrderNumber, OrderStatus, PaymentStatus, ProductId, ShopperId,
};

use super::{RepositoryError, map_unique_violation};
use crate::models::{NewOrderLine, Order, OrderLine, ShippingDetails};

/// Internal row type for order headers.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: String,
    order_number: String,
    ship_name: String,
    ship_email: Option<String>,
    ship_phone: String,
    ship_address_line1: String,
    ship_address_line2: Option<String>,
    ship_city: String,
    ship_state: String,
    ship_postal_code: String,
    ship_country: String,
    total: Decimal,
    status: OrderStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Internal row type for order lines.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i32,
    product_id: i32,
    name: String,
    price: Decimal,
    quantity: i32,
    subtotal: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            quantity: u32::try_from(row.quantity).unwrap_or_default(),
            subtotal: row.subtotal,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> Result<Order, RepositoryError> {
        let user_id = ShopperId::parse(&self.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid userId in database: {e}"))
        })?;
        let order_number = OrderNumber::parse(&self.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;
        let ship_email = match self.ship_email {
            Some(raw) => Some(Email::parse(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid shipping email in database: {e}"))
            })?),
            None => None,
        };

        Ok(Order {
            id: OrderId::new(self.id),
            user_id,
            order_number,
            items,
            shipping: ShippingDetails {
                name: self.ship_name,
                email: ship_email,
                phone: self.ship_phone,
                address_line1: self.ship_address_line1,
                address_line2: self.ship_address_line2,
                city: self.ship_city,
                state: self.ship_state,
                postal_code: self.ship_postal_code,
                country: self.ship_country,
            },
            total: self.total,
            status: self.status,
            payment_status: self.payment_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ORDER: &str = "SELECT id, user_id, order_number, ship_name, ship_email, ship_phone, \
            ship_address_line1, ship_address_line2, ship_city, ship_state, ship_postal_code, \
            ship_country, total, status, payment_status, created_at, updated_at \
     FROM orders";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its line snapshots inside a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number collides,
    /// `RepositoryError::Database` for other failures.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        shopper: &ShopperId,
        order_number: &OrderNumber,
        lines: &[NewOrderLine],
        shipping: &ShippingDetails,
        total: Decimal,
    ) -> Result<Order, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Inserted {
            id: i32,
            status: OrderStatus,
            payment_status: PaymentStatus,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        }

        let inserted = sqlx::query_as::<_, Inserted>(
            "INSERT INTO orders \
                 (user_id, order_number, ship_name, ship_email, ship_phone, ship_address_line1, \
                  ship_address_line2, ship_city, ship_state, ship_postal_code, ship_country, total) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id, status, payment_status, created_at, updated_at",
        )
        .bind(shopper)
        .bind(order_number)
        .bind(&shipping.name)
        .bind(shipping.email.as_ref())
        .bind(&shipping.phone)
        .bind(&shipping.address_line1)
        .bind(&shipping.address_line2)
        .bind(&shipping.city)
        .bind(&shipping.state)
        .bind(&shipping.postal_code)
        .bind(&shipping.country)
        .bind(total)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, "Order number already exists"))?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, price, quantity, subtotal) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(inserted.id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.price)
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .bind(line.subtotal)
            .execute(&mut *conn)
            .await?;

            items.push(OrderLine {
                product_id: line.product_id,
                name: line.name.clone(),
                price: line.price,
                quantity: line.quantity,
                subtotal: line.subtotal,
            });
        }

        Ok(Order {
            id: OrderId::new(inserted.id),
            user_id: shopper.clone(),
            order_number: order_number.clone(),
            items,
            shipping: shipping.clone(),
            total,
            status: inserted.status,
            payment_status: inserted.payment_status,
            created_at: inserted.created_at,
            updated_at: inserted.updated_at,
        })
    }

    /// Get an order by ID, optionally scoped to a shopper.
    ///
    /// With a scope, an order owned by someone else comes back as `None`,
    /// indistinguishable from an order that does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for unreadable stored values.
    pub async fn get(
        &self,
        id: OrderId,
        scope: Option<&ShopperId>,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };
        if let Some(shopper) = scope
            && row.user_id != shopper.as_str()
        {
            return Ok(None);
        }

        let items = self.items_for(&[row.id]).await?.remove(0);
        Ok(Some(row.into_order(items)?))
    }

    /// List a shopper's orders, newest first, with items included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for unreadable stored values.
    pub async fn list_for_shopper(
        &self,
        shopper: &ShopperId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(shopper)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut item_groups = self.items_for(&ids).await?;

        rows.into_iter()
            .zip(item_groups.drain(..))
            .map(|(row, items)| row.into_order(items))
            .collect()
    }

    /// Fetch line snapshots for a set of orders, grouped in `ids` order.
    async fn items_for(&self, ids: &[i32]) -> Result<Vec<Vec<OrderLine>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT order_id, product_id, name, price, quantity, subtotal \
             FROM order_items \
             WHERE order_id = ANY($1) \
             ORDER BY id",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut groups: Vec<Vec<OrderLine>> = ids.iter().map(|_| Vec::new()).collect();
        for row in rows {
            if let Some(pos) = ids.iter().position(|id| *id == row.order_id)
                && let Some(group) = groups.get_mut(pos)
            {
                group.push(row.into());
            }
        }

        Ok(groups)
    }
}
