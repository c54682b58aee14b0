//! Catalog administration: category and product creation, catalog reads.
//!
//! Creation payloads arrive as raw string fields (both the JSON and the
//! multipart paths produce the same shape - see `routes::payload`), so the
//! numeric parsing lives here where it can be tested.

use rust_decimal::Decimal;
use sqlx::PgPool;

use driftwood_core::{CategoryId, ProductId};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::{Category, NewCategory, NewProduct, Product};

/// Errors that can occur while managing the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Category name missing on create.
    #[error("Category name is required")]
    MissingCategoryName,

    /// Product name missing on create.
    #[error("Product name is required")]
    MissingProductName,

    /// Product create without a category reference.
    #[error("Category is required")]
    MissingCategory,

    /// The referenced category does not exist (or the ID is unparseable).
    #[error("Invalid category specified")]
    CategoryNotFound,

    /// Price missing or not a number.
    #[error("Price must be a valid number")]
    InvalidPrice,

    /// Price below zero.
    #[error("Price must not be negative")]
    NegativePrice,

    /// Stock quantity not a number or below zero.
    #[error("Quantity must be a valid number")]
    InvalidQuantity,

    /// Underlying repository failure (includes duplicate-name conflicts).
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Raw category-creation fields, identical for JSON and multipart bodies.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

/// Raw product-creation fields, identical for JSON and multipart bodies.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub dimension: Option<String>,
    pub material_care: Option<String>,
    pub images: Vec<String>,
}

/// Parse an optional numeric field the way form inputs behave: `None` or a
/// blank string mean "not provided", anything else must parse.
fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Result<Option<T>, ()> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| ()),
    }
}

/// Service for catalog reads and admin writes.
pub struct CatalogService<'a> {
    categories: CategoryRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// List all categories, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` failures via [`CatalogError::Repository`].
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.categories.list().await?)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingCategoryName`] for a blank name; a
    /// duplicate name surfaces as a repository conflict.
    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError> {
        let name = draft
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(CatalogError::MissingCategoryName)?
            .to_owned();

        let new = NewCategory {
            name,
            description: draft
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            images: draft.images,
        };

        Ok(self.categories.create(&new).await?)
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` failures via [`CatalogError::Repository`].
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// Get one product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` failures via [`CatalogError::Repository`].
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.get(id).await?)
    }

    /// Create a product.
    ///
    /// The category reference must resolve; price must be a non-negative
    /// number; a missing stock quantity defaults to 0 (tracked and empty)
    /// while a negative one is rejected.
    ///
    /// # Errors
    ///
    /// Returns the [`CatalogError`] naming the first failing field.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let name = draft
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(CatalogError::MissingProductName)?
            .to_owned();

        let category_raw = draft
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(CatalogError::MissingCategory)?;
        let category_id = category_raw
            .parse::<i32>()
            .map(CategoryId::new)
            .map_err(|_| CatalogError::CategoryNotFound)?;

        let price: Decimal = parse_number(draft.price.as_deref())
            .map_err(|()| CatalogError::InvalidPrice)?
            .ok_or(CatalogError::InvalidPrice)?;
        if price < Decimal::ZERO {
            return Err(CatalogError::NegativePrice);
        }

        let stock: i64 = parse_number(draft.quantity.as_deref())
            .map_err(|()| CatalogError::InvalidQuantity)?
            .unwrap_or(0);
        let stock = u32::try_from(stock).map_err(|_| CatalogError::InvalidQuantity)?;

        let category = self
            .categories
            .get(category_id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        let new = NewProduct {
            name,
            description: draft
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            category_id: category.id,
            price,
            stock: Some(stock),
            dimension: draft
                .dimension
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            material_care: draft
                .material_care
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned),
            images: draft.images,
        };

        let summary = crate::models::CategorySummary {
            id: category.id,
            name: category.name,
        };

        Ok(self.products.create(&new, summary).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_absent_and_blank() {
        assert_eq!(parse_number::<i64>(None).unwrap(), None);
        assert_eq!(parse_number::<i64>(Some("")).unwrap(), None);
        assert_eq!(parse_number::<i64>(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_parse_number_trims() {
        assert_eq!(parse_number::<i64>(Some(" 42 ")).unwrap(), Some(42));
        assert_eq!(
            parse_number::<Decimal>(Some(" 19.99 ")).unwrap(),
            Some("19.99".parse().unwrap())
        );
    }

    #[test]
    fn test_parse_number_garbage_is_an_error() {
        assert!(parse_number::<i64>(Some("many")).is_err());
        assert!(parse_number::<Decimal>(Some("1.2.3")).is_err());
    }
}
