//! Order route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use driftwood_core::{AddressId, OrderId, ShopperId};

use crate::error::AppError;
use crate::models::{Order, ShippingForm};
use crate::services::{OrderService, ShippingSource, orders::OrderItemInput};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new().route("/orders", get(get_orders).post(create_order))
}

/// Query parameters for order reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    order_id: Option<OrderId>,
    user_id: Option<String>,
}

/// Response wrapper for a single order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    order: Order,
}

/// Response wrapper for a shopper's order history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    user_id: ShopperId,
    orders: Vec<Order>,
}

/// Request body for placing an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    user_id: Option<String>,
    address_id: Option<AddressId>,
    shipping: Option<ShippingForm>,
    #[serde(default)]
    items: Vec<OrderItemInput>,
}

/// Response for order creation.
#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    message: &'static str,
    order: Order,
}

/// `GET /orders?orderId=[&userId=]` or `GET /orders?userId=` - fetch one
/// order (optionally scoped to its owner) or a shopper's history, newest
/// first.
///
/// # Errors
///
/// 404 when the order does not exist or belongs to someone else; 400 when
/// neither parameter is usable.
pub async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<axum::response::Response, AppError> {
    use axum::response::IntoResponse;

    let service = OrderService::new(state.pool());
    let shopper = query
        .user_id
        .as_deref()
        .and_then(|value| ShopperId::parse(value).ok());

    if let Some(order_id) = query.order_id {
        let order = service
            .get(order_id, shopper.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
        return Ok(Json(OrderResponse { order }).into_response());
    }

    let shopper = shopper.ok_or_else(|| {
        AppError::BadRequest("userId query parameter is required".to_owned())
    })?;
    let orders = service.list(&shopper).await?;
    Ok(Json(OrdersResponse {
        user_id: shopper,
        orders,
    })
    .into_response())
}

/// `POST /orders` - place an order.
///
/// Shipping comes from `addressId` (preferred, ownership-checked) or the
/// inline `shipping` object. Every line is validated against live stock
/// and decremented inside one transaction; any failure leaves stock and
/// orders untouched.
///
/// # Errors
///
/// 400 naming the failing line or shipping field ("Only {n} left for
/// {name}" for short stock); 500 on repository failure.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), AppError> {
    let shopper = body
        .user_id
        .as_deref()
        .and_then(|value| ShopperId::parse(value).ok())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_owned()))?;

    let shipping = ShippingSource::from_request(body.address_id, body.shipping);

    let order = OrderService::new(state.pool())
        .place(&shopper, shipping, &body.items)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderCreatedResponse {
            message: "Order created",
            order,
        }),
    ))
}
