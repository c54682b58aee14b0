//! Product repository.
//!
//! Besides catalog reads and writes, this module exposes the two
//! transaction-scoped operations order placement needs: locking a product
//! row for the duration of the order transaction and decrementing tracked
//! stock once a line has been validated against it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use driftwood_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::{CategorySummary, NewProduct, Product};

/// Internal row type for product queries (category name joined in).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    images: Vec<String>,
    category_id: i32,
    category_name: String,
    price: Decimal,
    stock: Option<i32>,
    dimension: Option<String>,
    material_care: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            images: row.images,
            category: CategorySummary {
                id: CategoryId::new(row.category_id),
                name: row.category_name,
            },
            price: row.price,
            stock: row.stock.map(|s| u32::try_from(s).unwrap_or_default()),
            dimension: row.dimension,
            material_care: row.material_care,
            created_at: row.created_at,
        }
    }
}

/// A product row held under `FOR UPDATE` inside an order transaction.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockedProduct {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub stock: Option<i32>,
}

impl LockedProduct {
    /// Units in stock, if the product tracks stock.
    #[must_use]
    pub fn tracked_stock(&self) -> Option<u32> {
        self.stock.map(|s| u32::try_from(s).unwrap_or_default())
    }
}

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.description, p.images, p.category_id, \
            c.name AS category_name, p.price, p.stock, p.dimension, p.material_care, p.created_at \
     FROM products p \
     JOIN categories c ON c.id = p.category_id";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first, with category names joined in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} ORDER BY p.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Create a new product.
    ///
    /// The caller has already resolved (and thereby validated) the category;
    /// its summary is embedded in the returned product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        new: &NewProduct,
        category: CategorySummary,
    ) -> Result<Product, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Inserted {
            id: i32,
            created_at: DateTime<Utc>,
        }

        let stock = new
            .stock
            .map(|s| i32::try_from(s).unwrap_or(i32::MAX));

        let inserted = sqlx::query_as::<_, Inserted>(
            "INSERT INTO products \
                 (name, description, images, category_id, price, stock, dimension, material_care) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, created_at",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.images)
        .bind(new.category_id)
        .bind(new.price)
        .bind(stock)
        .bind(&new.dimension)
        .bind(&new.material_care)
        .fetch_one(self.pool)
        .await?;

        Ok(Product {
            id: ProductId::new(inserted.id),
            name: new.name.clone(),
            description: new.description.clone(),
            images: new.images.clone(),
            category,
            price: new.price,
            stock: new.stock,
            dimension: new.dimension.clone(),
            material_care: new.material_care.clone(),
            created_at: inserted.created_at,
        })
    }

    /// Lock a product row for the duration of an order transaction.
    ///
    /// The `FOR UPDATE` lock serializes concurrent orders touching the same
    /// product, so two requests cannot both validate against the same stock
    /// level and oversell it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_for_order(
        &self,
        conn: &mut PgConnection,
        id: ProductId,
    ) -> Result<Option<LockedProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, price, stock FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Decrement tracked stock inside an order transaction.
    ///
    /// The caller has already checked `quantity <= stock` under the row
    /// lock; `GREATEST` keeps the floor at 0 regardless.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn decrement_stock(
        &self,
        conn: &mut PgConnection,
        id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products SET stock = GREATEST(stock - $2, 0) \
             WHERE id = $1 AND stock IS NOT NULL",
        )
        .bind(id)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
