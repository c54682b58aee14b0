//! Cart route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use driftwood_core::{ProductId, ShopperId};

use crate::error::AppError;
use crate::models::CartView;
use crate::services::{CartService, carts::parse_change};
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new().route("/cart", get(get_cart).post(add_item).patch(update_item))
}

/// Query parameters for reading a cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    user_id: Option<String>,
}

/// Response wrapper for cart reads.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    cart: CartView,
}

/// Response for cart mutations.
#[derive(Debug, Serialize)]
pub struct CartUpdatedResponse {
    message: &'static str,
    cart: CartView,
}

/// Request body for adding an item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    user_id: Option<String>,
    product_id: Option<ProductId>,
    quantity: Option<i64>,
}

/// Request body for adjusting or removing a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    user_id: Option<String>,
    product_id: Option<ProductId>,
    action: Option<String>,
    quantity: Option<i64>,
}

fn parse_shopper(raw: Option<&str>, message: &str) -> Result<ShopperId, AppError> {
    raw.and_then(|value| ShopperId::parse(value).ok())
        .ok_or_else(|| AppError::BadRequest(message.to_owned()))
}

/// `GET /cart?userId=` - the shopper's cart, or the empty shape.
///
/// # Errors
///
/// 400 without a `userId`.
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartResponse>, AppError> {
    let shopper = parse_shopper(
        query.user_id.as_deref(),
        "userId query parameter is required",
    )?;

    let cart = CartService::new(state.pool()).get(&shopper).await?;
    Ok(Json(CartResponse { cart }))
}

/// `POST /cart` - add a product, merging repeat adds into one line.
///
/// # Errors
///
/// 400 for a missing shopper/product or a non-positive quantity.
pub async fn add_item(
    State(state): State<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartUpdatedResponse>), AppError> {
    let shopper = parse_shopper(body.user_id.as_deref(), "userId is required")?;
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::BadRequest("productId is required".to_owned()))?;

    let cart = CartService::new(state.pool())
        .add_item(&shopper, product_id, body.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CartUpdatedResponse {
            message: "Product added to cart",
            cart,
        }),
    ))
}

/// `PATCH /cart` - adjust a line by action or explicit quantity.
///
/// A resulting quantity of zero (or below) removes the line entirely.
///
/// # Errors
///
/// 404 when the cart or line does not exist; 400 for a missing or invalid
/// change.
pub async fn update_item(
    State(state): State<AppState>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartUpdatedResponse>, AppError> {
    let shopper = parse_shopper(body.user_id.as_deref(), "userId is required")?;
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::BadRequest("productId is required".to_owned()))?;

    let change = parse_change(body.action.as_deref(), body.quantity).map_err(AppError::Cart)?;

    let cart = CartService::new(state.pool())
        .update_item(&shopper, product_id, change)
        .await?;

    Ok(Json(CartUpdatedResponse {
        message: "Cart updated",
        cart,
    }))
}
