//! Integration tests for order placement.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p driftwood-storefront)
//!
//! Run with: cargo test -p driftwood-integration-tests -- --ignored

use driftwood_integration_tests::{
    base_url, client, create_category, create_product, inline_shipping, product_stock,
    unique_shopper,
};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_order_decrements_stock_and_totals_lines() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    // The worked example: price 100, stock 5, order 3.
    let product = create_product(&client, category, "Oak Shelf", "100", 5).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": shopper,
            "shipping": inline_shipping(),
            "items": [{ "productId": product, "quantity": 3 }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("Invalid order JSON");
    let order = &body["order"];
    assert_eq!(body["message"], "Order created");
    assert_eq!(order["items"].as_array().expect("items").len(), 1);
    assert_eq!(order["total"].as_str(), Some("300"));
    assert_eq!(order["items"][0]["subtotal"].as_str(), Some("300"));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert!(
        order["orderNumber"].as_str().expect("order number").starts_with("ORD-"),
        "order number shape"
    );

    assert_eq!(product_stock(&client, product).await, 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_ordering_more_than_stock_fails_without_mutation() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 5).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": shopper,
            "shipping": inline_shipping(),
            "items": [{ "productId": product, "quantity": 10 }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Only 5 left for Oak Shelf");

    // Nothing was written.
    assert_eq!(product_stock(&client, product).await, 5);
    let history: Value = client
        .get(format!("{}/orders?userId={shopper}", base_url()))
        .send()
        .await
        .expect("Failed to list orders")
        .json()
        .await
        .expect("Invalid orders JSON");
    assert_eq!(history["orders"].as_array().expect("orders").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_failing_line_rolls_back_earlier_decrements() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let plentiful = create_product(&client, category, "Linen Cushion", "40", 50).await;
    let scarce = create_product(&client, category, "Brass Lamp", "310", 1).await;

    // First line is satisfiable, second is not: the whole order must fail
    // and the first product's stock must be untouched.
    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": shopper,
            "shipping": inline_shipping(),
            "items": [
                { "productId": plentiful, "quantity": 5 },
                { "productId": scarce, "quantity": 2 },
            ],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Only 1 left for Brass Lamp");

    assert_eq!(product_stock(&client, plentiful).await, 50);
    assert_eq!(product_stock(&client, scarce).await, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_unknown_product_reference_is_400() {
    let client = client();
    let shopper = unique_shopper();

    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": shopper,
            "shipping": inline_shipping(),
            "items": [{ "productId": 999_999_999, "quantity": 1 }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert!(
        body["message"].as_str().expect("message").starts_with("Product not found"),
        "got: {}",
        body["message"]
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_missing_shipping_is_400() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 5).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": shopper,
            "items": [{ "productId": product, "quantity": 1 }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Shipping details are required");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_saved_address_is_preferred_and_ownership_checked() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 5).await;

    // Save an address for this shopper.
    let resp = client
        .post(format!("{}/customer-info", base_url()))
        .json(&json!({
            "userId": shopper,
            "name": "Asha Rao",
            "phone": "+919876543210",
            "addressLine1": "14 Teak Lane",
            "city": "Pune",
            "state": "MH",
            "postalCode": "411001",
            "country": "IN",
            "isDefault": true,
        }))
        .send()
        .await
        .expect("Failed to save address");
    assert_eq!(resp.status(), 201);
    let address: Value = resp.json().await.expect("Invalid address JSON");
    let address_id = address["address"]["id"].as_i64().expect("address id");

    // Order with the saved address.
    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": shopper,
            "addressId": address_id,
            "items": [{ "productId": product, "quantity": 1 }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("Invalid order JSON");
    assert_eq!(body["order"]["shipping"]["city"], "Pune");

    // Another shopper cannot order against that address.
    let stranger = unique_shopper();
    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "userId": stranger,
            "addressId": address_id,
            "items": [{ "productId": product, "quantity": 1 }],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Address not found for this user");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_order_history_is_newest_first_and_scoped() {
    let client = client();
    let shopper = unique_shopper();
    let category = create_category(&client, &format!("cat-{shopper}")).await;
    let product = create_product(&client, category, "Oak Shelf", "100", 50).await;

    for quantity in [1, 2] {
        let resp = client
            .post(format!("{}/orders", base_url()))
            .json(&json!({
                "userId": shopper,
                "shipping": inline_shipping(),
                "items": [{ "productId": product, "quantity": quantity }],
            }))
            .send()
            .await
            .expect("Failed to place order");
        assert_eq!(resp.status(), 201);
    }

    let body: Value = client
        .get(format!("{}/orders?userId={shopper}", base_url()))
        .send()
        .await
        .expect("Failed to list orders")
        .json()
        .await
        .expect("Invalid orders JSON");

    let orders = body["orders"].as_array().expect("orders");
    assert_eq!(orders.len(), 2);
    // Newest first: the quantity-2 order was placed last.
    assert_eq!(orders[0]["items"][0]["quantity"], 2);

    // Fetching by ID with the wrong userId scope is a 404.
    let order_id = orders[0]["id"].as_i64().expect("order id");
    let stranger = unique_shopper();
    let resp = client
        .get(format!(
            "{}/orders?orderId={order_id}&userId={stranger}",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to fetch order");
    assert_eq!(resp.status(), 404);
}
