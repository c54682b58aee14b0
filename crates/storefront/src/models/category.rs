//! Category domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use driftwood_core::CategoryId;

/// A catalog category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name, unique across the catalog.
    pub name: String,
    /// Optional blurb shown on category pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URLs (uploaded files or external links).
    pub images: Vec<String>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub images: Vec<String>,
}
