//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use driftwood_core::{CategoryId, ProductId};

/// The category a product belongs to, as embedded in product payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product.
///
/// Products are the source of truth for price and stock; carts and orders
/// copy `name`/`price` into their own lines at operation time, so later
/// edits here never change a historical total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URLs, first entry is the primary image.
    pub images: Vec<String>,
    /// Category the product belongs to.
    pub category: CategorySummary,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock. `None` means the product does not track stock:
    /// it is never checked or decremented by order placement.
    #[serde(rename = "quantity")]
    pub stock: Option<u32>,
    /// Free-text dimensions ("W 40cm x H 60cm").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    /// Free-text material and care instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_care: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub price: Decimal,
    pub stock: Option<u32>,
    pub dimension: Option<String>,
    pub material_care: Option<String>,
    pub images: Vec<String>,
}

impl Product {
    /// First image URL, if any (used as the thumbnail in cart lines).
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
