//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use driftwood_core::{
    Email, OrderId, OrderNumber, OrderStatus, PaymentStatus, ProductId, ShopperId,
};

use super::{Address, optional_field, require_field};

/// An immutable order line snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// An order line about to be written (no ID yet).
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// The shipping snapshot embedded in an order.
///
/// Copied from a saved address or the inline form at placement time;
/// deleting the saved address later leaves the order untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    pub phone: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Inline shipping details as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Errors validating inline shipping details.
#[derive(Debug, Clone, Error)]
pub enum ShippingError {
    /// A required field was missing or blank.
    #[error("Shipping field {0} is required")]
    MissingField(&'static str),
    /// The optional email was present but unparseable.
    #[error("Shipping email is invalid: {0}")]
    InvalidEmail(#[from] driftwood_core::EmailError),
}

impl ShippingDetails {
    /// Validate an inline shipping form.
    ///
    /// Every field except `email` and `addressLine2` must be a non-empty
    /// string; all values are trimmed and the email is normalized.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::MissingField`] naming the first missing
    /// field, or [`ShippingError::InvalidEmail`] for a malformed email.
    pub fn try_from_form(form: &ShippingForm) -> Result<Self, ShippingError> {
        let require = |name, value: &Option<String>| {
            require_field(name, value.as_deref()).map_err(|e| ShippingError::MissingField(e.0))
        };

        let email = match optional_field(form.email.as_deref()) {
            Some(raw) => Some(Email::parse(&raw)?),
            None => None,
        };

        Ok(Self {
            name: require("name", &form.name)?,
            email,
            phone: require("phone", &form.phone)?,
            address_line1: require("addressLine1", &form.address_line1)?,
            address_line2: optional_field(form.address_line2.as_deref()),
            city: require("city", &form.city)?,
            state: require("state", &form.state)?,
            postal_code: require("postalCode", &form.postal_code)?,
            country: require("country", &form.country)?,
        })
    }
}

impl From<Address> for ShippingDetails {
    fn from(address: Address) -> Self {
        Self {
            name: address.name,
            email: address.email,
            phone: address.phone,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

/// A placed order.
///
/// Created once; only `status` and `payment_status` may change afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: ShopperId,
    pub order_number: OrderNumber,
    pub items: Vec<OrderLine>,
    pub shipping: ShippingDetails,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_form() -> ShippingForm {
        ShippingForm {
            name: Some("Asha Rao".to_owned()),
            email: Some(" Asha@Example.com ".to_owned()),
            phone: Some("+91 98765 43210".to_owned()),
            address_line1: Some("14 Teak Lane".to_owned()),
            address_line2: Some("".to_owned()),
            city: Some("Pune".to_owned()),
            state: Some("MH".to_owned()),
            postal_code: Some("411001".to_owned()),
            country: Some("IN".to_owned()),
        }
    }

    #[test]
    fn test_full_form_validates_and_normalizes() {
        let shipping = ShippingDetails::try_from_form(&full_form()).unwrap();
        assert_eq!(shipping.name, "Asha Rao");
        assert_eq!(shipping.email.unwrap().as_str(), "asha@example.com");
        assert_eq!(shipping.address_line2, None); // blank collapses to None
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut form = full_form();
        form.postal_code = None;
        let err = ShippingDetails::try_from_form(&form).unwrap_err();
        assert_eq!(err.to_string(), "Shipping field postalCode is required");
    }

    #[test]
    fn test_blank_field_is_missing() {
        let mut form = full_form();
        form.city = Some("   ".to_owned());
        assert!(matches!(
            ShippingDetails::try_from_form(&form),
            Err(ShippingError::MissingField("city"))
        ));
    }

    #[test]
    fn test_email_is_optional_but_validated() {
        let mut form = full_form();
        form.email = None;
        assert!(ShippingDetails::try_from_form(&form).unwrap().email.is_none());

        form.email = Some("not-an-email".to_owned());
        assert!(matches!(
            ShippingDetails::try_from_form(&form),
            Err(ShippingError::InvalidEmail(_))
        ));
    }
}
