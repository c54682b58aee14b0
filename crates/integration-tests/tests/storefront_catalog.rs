//! Integration tests for catalog management.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p driftwood-storefront)
//!
//! Run with: cargo test -p driftwood-integration-tests -- --ignored

use driftwood_integration_tests::{base_url, client, create_category, unique_shopper};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_duplicate_category_name_is_409() {
    let client = client();
    let name = format!("cat-{}", unique_shopper());

    create_category(&client, &name).await;

    let resp = client
        .post(format!("{}/categories", base_url()))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), 409);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Category already exists");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_product_requires_existing_category() {
    let client = client();

    let resp = client
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": "Orphan Shelf",
            "category": 999_999_999,
            "price": "10",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Invalid category specified");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_product_price_must_be_numeric() {
    let client = client();
    let category = create_category(&client, &format!("cat-{}", unique_shopper())).await;

    let resp = client
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": "Oak Shelf",
            "category": category,
            "price": "a lot",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Price must be a valid number");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_fetching_missing_product_is_404() {
    let resp = client()
        .get(format!("{}/products?id=999999999", base_url()))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_multipart_category_upload_stores_image() {
    let client = client();
    let name = format!("cat-{}", unique_shopper());

    let form = reqwest::multipart::Form::new()
        .text("name", name.clone())
        .text("description", "Uploaded via multipart")
        .part(
            "images",
            reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
                .file_name("swatch.jpg")
                .mime_str("image/jpeg")
                .expect("mime"),
        );

    let resp = client
        .post(format!("{}/categories", base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("Invalid category JSON");
    let images = body["category"]["images"].as_array().expect("images");
    assert_eq!(images.len(), 1);
    let url = images[0].as_str().expect("image url");
    assert!(url.starts_with("/uploads/category-"), "got: {url}");
    assert!(url.ends_with(".jpg"));

    // The stored file is served back.
    let resp = client
        .get(format!("{}{url}", base_url()))
        .send()
        .await
        .expect("Failed to fetch upload");
    assert_eq!(resp.status(), 200);
}
