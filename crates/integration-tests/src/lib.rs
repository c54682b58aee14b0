//! Integration tests for Driftwood Home.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p driftwood-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p driftwood-storefront
//!
//! # Run the (otherwise ignored) integration tests
//! cargo test -p driftwood-integration-tests -- --ignored
//! ```
//!
//! The tests talk to a real server and database; every test creates its own
//! uniquely named fixtures so runs do not interfere with each other.
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - server under test (default: `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - only needed by the OTP tests, which read
//!   the issued code straight from the `users` table

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// A unique shopper ID for this test run.
#[must_use]
pub fn unique_shopper() -> String {
    format!("it-{}", Uuid::new_v4())
}

/// A unique email for this test run.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4())
}

/// Create a category via the API and return its ID.
///
/// # Panics
///
/// Panics when the API rejects the request.
pub async fn create_category(client: &Client, name: &str) -> i64 {
    let resp = client
        .post(format!("{}/categories", base_url()))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), 201, "category create failed");

    let body: Value = resp.json().await.expect("Invalid category JSON");
    body["category"]["id"].as_i64().expect("category id")
}

/// Create a product via the API and return its ID.
///
/// # Panics
///
/// Panics when the API rejects the request.
pub async fn create_product(
    client: &Client,
    category_id: i64,
    name: &str,
    price: &str,
    quantity: i64,
) -> i64 {
    let resp = client
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": name,
            "category": category_id,
            "price": price,
            "quantity": quantity,
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), 201, "product create failed");

    let body: Value = resp.json().await.expect("Invalid product JSON");
    body["product"]["id"].as_i64().expect("product id")
}

/// Fetch one product and return its stock count (`quantity` on the wire).
///
/// # Panics
///
/// Panics when the product cannot be fetched.
pub async fn product_stock(client: &Client, product_id: i64) -> i64 {
    let resp = client
        .get(format!("{}/products?id={product_id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Invalid product JSON");
    body["product"]["quantity"].as_i64().expect("stock count")
}

/// An inline shipping object with every required field filled.
#[must_use]
pub fn inline_shipping() -> Value {
    json!({
        "name": "Asha Rao",
        "phone": "+919876543210",
        "addressLine1": "14 Teak Lane",
        "city": "Pune",
        "state": "MH",
        "postalCode": "411001",
        "country": "IN",
    })
}
