//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! types; the `db` repositories convert rows into them and the routes
//! serialize them straight onto the wire (camelCase names).

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, AddressForm, AddressFormError, NewAddress};
pub use cart::{CartLine, CartView, LineChange};
pub use category::{Category, NewCategory};
pub use order::{NewOrderLine, Order, OrderLine, ShippingDetails, ShippingError, ShippingForm};
pub use product::{CategorySummary, NewProduct, Product};
pub use user::User;

use thiserror::Error;

/// A required form field was missing, empty, or whitespace-only.
#[derive(Debug, Clone, Error)]
#[error("{0} is required")]
pub struct MissingField(pub &'static str);

/// Extract a required trimmed string field from an optional form value.
pub(crate) fn require_field(
    name: &'static str,
    value: Option<&str>,
) -> Result<String, MissingField> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(MissingField(name)),
    }
}

/// Trim an optional field, mapping empty strings to `None`.
pub(crate) fn optional_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field_trims() {
        assert_eq!(require_field("name", Some("  Oak Shelf ")).unwrap(), "Oak Shelf");
    }

    #[test]
    fn test_require_field_rejects_blank_and_missing() {
        assert!(require_field("name", Some("   ")).is_err());
        assert!(require_field("name", None).is_err());
        assert_eq!(require_field("city", None).unwrap_err().to_string(), "city is required");
    }

    #[test]
    fn test_optional_field() {
        assert_eq!(optional_field(Some(" walnut ")), Some("walnut".to_owned()));
        assert_eq!(optional_field(Some("  ")), None);
        assert_eq!(optional_field(None), None);
    }
}
