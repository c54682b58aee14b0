//! Product route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use driftwood_core::ProductId;

use crate::error::AppError;
use crate::models::Product;
use crate::routes::payload::ProductSubmission;
use crate::services::{CatalogService, catalog::ProductDraft};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new().route("/products", get(get_products).post(create_product))
}

/// Query parameters for product reads.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    id: Option<ProductId>,
}

/// Response wrapper for product listings.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    products: Vec<Product>,
}

/// Response wrapper for a single product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    product: Product,
}

/// Response for product creation.
#[derive(Debug, Serialize)]
pub struct ProductCreatedResponse {
    message: &'static str,
    product: Product,
}

/// `GET /products[?id=]` - all products newest first, or one by ID.
///
/// # Errors
///
/// 404 when `id` names a missing product.
pub async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<axum::response::Response, AppError> {
    use axum::response::IntoResponse;

    let catalog = CatalogService::new(state.pool());

    if let Some(id) = query.id {
        let product = catalog
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
        return Ok(Json(ProductResponse { product }).into_response());
    }

    let products = catalog.list_products().await?;
    Ok(Json(ProductsResponse { products }).into_response())
}

/// `POST /products` - create a product from JSON or multipart.
///
/// # Errors
///
/// 400 for missing/invalid fields or an unknown category.
pub async fn create_product(
    State(state): State<AppState>,
    submission: ProductSubmission,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), AppError> {
    let mut images = submission.image_urls;
    for file in &submission.files {
        let url = state
            .images()
            .save("product", file.file_name.as_deref(), &file.bytes)
            .await?;
        images.push(url);
    }

    let product = CatalogService::new(state.pool())
        .create_product(ProductDraft {
            name: submission.name,
            description: submission.description,
            category: submission.category,
            price: submission.price,
            quantity: submission.quantity,
            dimension: submission.dimension,
            material_care: submission.material_care,
            images,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            message: "Product created",
            product,
        }),
    ))
}
