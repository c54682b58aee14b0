//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /categories             - List categories (newest first)
//! POST /categories             - Create category (JSON or multipart)
//! GET  /products               - List products, or ?id= for one
//! POST /products               - Create product (JSON or multipart)
//!
//! # Cart
//! GET  /cart?userId=           - Read cart (empty shape if absent)
//! POST /cart                   - Add item (merges repeat adds)
//! PATCH /cart                  - Adjust line (increase/decrease/quantity)
//!
//! # Addresses
//! GET  /customer-info?userId=  - List addresses (default first)
//! POST /customer-info          - Save address (atomic default handoff)
//!
//! # Orders
//! GET  /orders?orderId=        - Fetch one order (optional userId scope)
//! GET  /orders?userId=         - Order history, newest first
//! POST /orders                 - Place order (transactional stock checks)
//!
//! # Auth
//! POST /auth/send-otp          - Issue a sign-in code via email
//! POST /auth/verify-otp        - Verify code, get a 7-day session token
//!
//! # Static
//! GET  /uploads/*              - Uploaded catalog images
//! ```
//!
//! Every error response is JSON: `{"message": "..."}`.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod customer_info;
pub mod orders;
pub mod payload;
pub mod products;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check payload.
#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

/// `GET /health` - liveness only, no dependency checks.
async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// `GET /health/ready` - verifies database connectivity.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Assemble every API route (static file serving and middleware layers are
/// added in `lib::app`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(categories::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(customer_info::router())
        .merge(orders::router())
        .merge(auth::router())
}
