//! Integration tests for saved addresses.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p driftwood-storefront)
//!
//! Run with: cargo test -p driftwood-integration-tests -- --ignored

use driftwood_integration_tests::{base_url, client, unique_shopper};
use serde_json::{Value, json};

fn address_body(shopper: &str, line1: &str, is_default: bool) -> Value {
    json!({
        "userId": shopper,
        "name": "Asha Rao",
        "phone": "+919876543210",
        "addressLine1": line1,
        "city": "Pune",
        "state": "MH",
        "postalCode": "411001",
        "country": "IN",
        "isDefault": is_default,
    })
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_exactly_one_default_after_handoff() {
    let client = client();
    let shopper = unique_shopper();

    for (line1, is_default) in [
        ("1 First Street", true),
        ("2 Second Street", false),
        ("3 Third Street", true),
    ] {
        let resp = client
            .post(format!("{}/customer-info", base_url()))
            .json(&address_body(&shopper, line1, is_default))
            .send()
            .await
            .expect("Failed to save address");
        assert_eq!(resp.status(), 201);
    }

    let body: Value = client
        .get(format!("{}/customer-info?userId={shopper}", base_url()))
        .send()
        .await
        .expect("Failed to list addresses")
        .json()
        .await
        .expect("Invalid addresses JSON");

    let addresses = body["addresses"].as_array().expect("addresses");
    assert_eq!(addresses.len(), 3);

    let defaults: Vec<&Value> = addresses
        .iter()
        .filter(|a| a["isDefault"] == true)
        .collect();
    assert_eq!(defaults.len(), 1, "exactly one default after handoff");
    assert_eq!(defaults[0]["addressLine1"], "3 Third Street");

    // Default sorts first.
    assert_eq!(addresses[0]["addressLine1"], "3 Third Street");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_missing_required_field_is_named() {
    let client = client();
    let shopper = unique_shopper();

    let mut body = address_body(&shopper, "1 First Street", false);
    body.as_object_mut().expect("object").remove("postalCode");

    let resp = client
        .post(format!("{}/customer-info", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to save address");
    assert_eq!(resp.status(), 400);

    let error: Value = resp.json().await.expect("Invalid error JSON");
    assert_eq!(error["message"], "postalCode is required");
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_listing_requires_user_id() {
    let resp = client()
        .get(format!("{}/customer-info", base_url()))
        .send()
        .await
        .expect("Failed to list addresses");
    assert_eq!(resp.status(), 400);
}
