//! Seed the catalog from a YAML file.
//!
//! The file is parsed and validated in full before the database is touched;
//! categories are matched by name so re-running the seed is safe (existing
//! categories are reused, products are appended).

use std::path::Path;

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::info;

use driftwood_storefront::db::{self, CategoryRepository, ProductRepository, RepositoryError};
use driftwood_storefront::models::{NewCategory, NewProduct};

/// A product entry in the seed file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub dimension: Option<String>,
    #[serde(default)]
    pub material_care: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A category entry in the seed file, with its products.
#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// The seed file root.
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    pub categories: Vec<SeedCategory>,
}

/// Validate a parsed seed file, returning one message per problem.
#[must_use]
pub fn validate_config(config: &SeedConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.categories.is_empty() {
        errors.push("seed file contains no categories".to_owned());
    }

    for category in &config.categories {
        if category.name.trim().is_empty() {
            errors.push("category with an empty name".to_owned());
        }
        for product in &category.products {
            if product.name.trim().is_empty() {
                errors.push(format!(
                    "product with an empty name in category '{}'",
                    category.name
                ));
            }
            if product.price < Decimal::ZERO {
                errors.push(format!("product '{}' has a negative price", product.name));
            }
        }
    }

    errors
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or fails validation, or database operations fail.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "STOREFRONT_DATABASE_URL not set")?;

    // Verify file exists
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed from file");

    // Read and validate YAML before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let config: SeedConfig = serde_yaml::from_str(&content)?;

    let errors = validate_config(&config);
    if !errors.is_empty() {
        return Err(format!("Invalid seed file:\n  {}", errors.join("\n  ")).into());
    }

    info!(categories = config.categories.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url).await?;
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let mut created_products = 0usize;

    for entry in &config.categories {
        let category = match categories.find_by_name(entry.name.trim()).await? {
            Some(existing) => {
                info!(category = %existing.name, "Category already present, reusing");
                existing
            }
            None => {
                let created = categories
                    .create(&NewCategory {
                        name: entry.name.trim().to_owned(),
                        description: entry.description.clone(),
                        images: entry.images.clone(),
                    })
                    .await?;
                info!(category = %created.name, "Category created");
                created
            }
        };

        for product in &entry.products {
            let summary = driftwood_storefront::models::CategorySummary {
                id: category.id,
                name: category.name.clone(),
            };
            products
                .create(
                    &NewProduct {
                        name: product.name.trim().to_owned(),
                        description: product.description.clone(),
                        category_id: category.id,
                        price: product.price,
                        stock: Some(product.quantity.unwrap_or(0)),
                        dimension: product.dimension.clone(),
                        material_care: product.material_care.clone(),
                        images: product.images.clone(),
                    },
                    summary,
                )
                .await
                .map_err(|e: RepositoryError| format!("seeding '{}': {e}", product.name))?;
            created_products += 1;
        }
    }

    info!(products = created_products, "Catalog seed complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_file_parses_and_validates() {
        let config: SeedConfig = serde_yaml::from_str(
            r"
categories:
  - name: Shelving
    description: Wall-mounted and freestanding shelves
    products:
      - name: Oak Shelf
        price: '129.00'
        quantity: 5
        dimension: W 60cm x D 20cm
",
        )
        .unwrap();

        assert!(validate_config(&config).is_empty());
        let product = &config.categories[0].products[0];
        assert_eq!(product.price, "129.00".parse().unwrap());
        assert_eq!(product.quantity, Some(5));
    }

    #[test]
    fn test_empty_file_is_invalid() {
        let config = SeedConfig {
            categories: Vec::new(),
        };
        assert_eq!(validate_config(&config).len(), 1);
    }

    #[test]
    fn test_negative_price_flagged() {
        let config: SeedConfig = serde_yaml::from_str(
            r"
categories:
  - name: Shelving
    products:
      - name: Oak Shelf
        price: '-1'
",
        )
        .unwrap();

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("negative price"));
    }
}
