//! Category route handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::models::Category;
use crate::routes::payload::CategorySubmission;
use crate::services::{CatalogService, catalog::CategoryDraft};
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories).post(create_category))
}

/// Response wrapper for category listings.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    categories: Vec<Category>,
}

/// Response for category creation.
#[derive(Debug, Serialize)]
pub struct CategoryCreatedResponse {
    message: &'static str,
    category: Category,
}

/// `GET /categories` - all categories, newest first.
///
/// # Errors
///
/// 500 on repository failure.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = CatalogService::new(state.pool()).list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// `POST /categories` - create a category from JSON or multipart.
///
/// Multipart image files are stored first; their URLs join any submitted
/// URL list on the created category.
///
/// # Errors
///
/// 400 for a missing name, 409 for a duplicate one.
pub async fn create_category(
    State(state): State<AppState>,
    submission: CategorySubmission,
) -> Result<(StatusCode, Json<CategoryCreatedResponse>), AppError> {
    let mut images = submission.image_urls;
    for file in &submission.files {
        let url = state
            .images()
            .save("category", file.file_name.as_deref(), &file.bytes)
            .await?;
        images.push(url);
    }

    let category = CatalogService::new(state.pool())
        .create_category(CategoryDraft {
            name: submission.name,
            description: submission.description,
            images,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryCreatedResponse {
            message: "Category created",
            category,
        }),
    ))
}
