//! Integration tests for the cart flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p driftwood-storefront)
//!
//! Run with: cargo test -p driftwood-integration-tests -- --ignored

use driftwood_integration_tests::{
    base_url, client, create_category, create_product, unique_shopper,
};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_absent_cart_reads_as_empty_shape() {
    let client = client();
    let shopper = unique_shopper();

    let resp = client
        .get(format!("{}/cart?userId={shopper}", base_url()))
        .send()
        .await
        .expect("Failed to read cart");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Invalid cart JSON");
    assert_eq!(body["cart"]["userId"], shopper.as_str());
    assert_eq!(body["cart"]["items"].as_array().expect("items").len(), 0);
    assert_eq!(body["cart"]["total"].as_str(), Some("0"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_adding_same_product_twice_merges_lines() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 10).await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/cart", base_url()))
            .json(&json!({ "userId": shopper, "productId": product, "quantity": 2 }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), 201);
    }

    let resp = client
        .get(format!("{}/cart?userId={shopper}", base_url()))
        .send()
        .await
        .expect("Failed to read cart");
    let body: Value = resp.json().await.expect("Invalid cart JSON");

    let items = body["cart"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 1, "repeat add must merge, not append");
    assert_eq!(items[0]["quantity"], 4);
    assert_eq!(body["cart"]["total"].as_str(), Some("400"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_decrease_to_zero_removes_line() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 10).await;

    client
        .post(format!("{}/cart", base_url()))
        .json(&json!({ "userId": shopper, "productId": product, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .patch(format!("{}/cart", base_url()))
        .json(&json!({ "userId": shopper, "productId": product, "action": "decrease" }))
        .send()
        .await
        .expect("Failed to patch cart");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Invalid cart JSON");
    assert_eq!(body["cart"]["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_explicit_quantity_replaces_line_count() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 10).await;

    client
        .post(format!("{}/cart", base_url()))
        .json(&json!({ "userId": shopper, "productId": product, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .patch(format!("{}/cart", base_url()))
        .json(&json!({ "userId": shopper, "productId": product, "quantity": 7 }))
        .send()
        .await
        .expect("Failed to patch cart");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Invalid cart JSON");
    let items = body["cart"]["items"].as_array().expect("items");
    assert_eq!(items[0]["quantity"], 7);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_patching_missing_cart_is_404() {
    let client = client();
    let shopper = unique_shopper();

    let resp = client
        .patch(format!("{}/cart", base_url()))
        .json(&json!({ "userId": shopper, "productId": 1, "action": "increase" }))
        .send()
        .await
        .expect("Failed to patch cart");
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Cart not found");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_cart_read_requires_user_id() {
    let resp = client()
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to read cart");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "userId query parameter is required");
}
