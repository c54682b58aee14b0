//! Saved-address (customer info) route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use driftwood_core::ShopperId;

use crate::db::AddressRepository;
use crate::error::AppError;
use crate::models::{Address, AddressForm, NewAddress};
use crate::state::AppState;

/// Build the customer-info router.
pub fn router() -> Router<AppState> {
    Router::new().route("/customer-info", get(list_addresses).post(create_address))
}

/// Query parameters for listing addresses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressQuery {
    user_id: Option<String>,
}

/// Response wrapper for address listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressesResponse {
    user_id: ShopperId,
    addresses: Vec<Address>,
}

/// Request body for saving an address.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressRequest {
    user_id: Option<String>,
    #[serde(flatten)]
    form: AddressForm,
}

/// Response for address creation.
#[derive(Debug, Serialize)]
pub struct AddressCreatedResponse {
    message: &'static str,
    address: Address,
}

/// `GET /customer-info?userId=` - saved addresses, default first, then most
/// recently updated.
///
/// # Errors
///
/// 400 without a `userId`.
pub async fn list_addresses(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<AddressesResponse>, AppError> {
    let shopper = query
        .user_id
        .as_deref()
        .and_then(|value| ShopperId::parse(value).ok())
        .ok_or_else(|| AppError::BadRequest("userId query parameter is required".to_owned()))?;

    let addresses = AddressRepository::new(state.pool()).list(&shopper).await?;
    Ok(Json(AddressesResponse {
        user_id: shopper,
        addresses,
    }))
}

/// `POST /customer-info` - save an address.
///
/// When `isDefault` is true the flag moves here atomically: existing
/// defaults are cleared and the row inserted in one transaction, so the
/// shopper ends up with exactly one default.
///
/// # Errors
///
/// 400 naming the first missing required field.
pub async fn create_address(
    State(state): State<AppState>,
    Json(body): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<AddressCreatedResponse>), AppError> {
    let shopper = body
        .user_id
        .as_deref()
        .and_then(|value| ShopperId::parse(value).ok())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_owned()))?;

    let new = NewAddress::try_from_form(shopper, &body.form)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let address = AddressRepository::new(state.pool()).create(&new).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddressCreatedResponse {
            message: "Customer info saved",
            address,
        }),
    ))
}
