//! Saved shipping address (customer info) domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use driftwood_core::{AddressId, Email, ShopperId};

use super::{MissingField, optional_field, require_field};

/// A saved shipping address.
///
/// At most one address per shopper carries `is_default = true`; the
/// repository enforces that by clearing existing flags and inserting the
/// new row in a single transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: ShopperId,
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
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An address form as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Errors validating an address form.
#[derive(Debug, Clone, Error)]
pub enum AddressFormError {
    /// A required field was missing or blank.
    #[error(transparent)]
    MissingField(#[from] MissingField),
    /// The optional email was present but unparseable.
    #[error("email is invalid: {0}")]
    InvalidEmail(#[from] driftwood_core::EmailError),
}

/// A validated address ready to insert.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: ShopperId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

impl NewAddress {
    /// Validate a submitted form for the given shopper.
    ///
    /// Every field except `email` and `addressLine2` must be a non-empty
    /// string; all values are trimmed and the email is normalized.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing field, or flagging a
    /// malformed email.
    pub fn try_from_form(user_id: ShopperId, form: &AddressForm) -> Result<Self, AddressFormError> {
        let email = match optional_field(form.email.as_deref()) {
            Some(raw) => Some(Email::parse(&raw)?),
            None => None,
        };

        Ok(Self {
            user_id,
            name: require_field("name", form.name.as_deref())?,
            email,
            phone: require_field("phone", form.phone.as_deref())?,
            address_line1: require_field("addressLine1", form.address_line1.as_deref())?,
            address_line2: optional_field(form.address_line2.as_deref()),
            city: require_field("city", form.city.as_deref())?,
            state: require_field("state", form.state.as_deref())?,
            postal_code: require_field("postalCode", form.postal_code.as_deref())?,
            country: require_field("country", form.country.as_deref())?,
            is_default: form.is_default,
        })
    }
}
