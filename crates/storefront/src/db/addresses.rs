//! Saved address (customer info) repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use driftwood_core::{AddressId, Email, ShopperId};

use super::RepositoryError;
use crate::models::{Address, NewAddress};

/// Internal row type for address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: String,
    name: String,
    email: Option<String>,
    phone: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AddressRow {
    fn into_address(self) -> Result<Address, RepositoryError> {
        let user_id = ShopperId::parse(&self.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid userId in database: {e}"))
        })?;
        let email = match self.email {
            Some(raw) => Some(Email::parse(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?),
            None => None,
        };

        Ok(Address {
            id: AddressId::new(self.id),
            user_id,
            name: self.name,
            email,
            phone: self.phone,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ADDRESS: &str = "SELECT id, user_id, name, email, phone, address_line1, \
            address_line2, city, state, postal_code, country, is_default, created_at, updated_at \
     FROM addresses";

/// Repository for saved-address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a shopper's addresses, default first, then most recently updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for unreadable stored values.
    pub async fn list(&self, shopper: &ShopperId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "{SELECT_ADDRESS} WHERE user_id = $1 ORDER BY is_default DESC, updated_at DESC"
        ))
        .bind(shopper)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AddressRow::into_address).collect()
    }

    /// Find an address by ID, but only if the shopper owns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for unreadable stored values.
    pub async fn find_owned(
        &self,
        shopper: &ShopperId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "{SELECT_ADDRESS} WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(shopper)
        .fetch_optional(self.pool)
        .await?;

        row.map(AddressRow::into_address).transpose()
    }

    /// Insert a new address.
    ///
    /// When the new address is the default, clearing the flag on the
    /// shopper's existing rows and inserting the new one happen in a single
    /// transaction, so there is never an instant with two defaults (or, on
    /// failure, zero inserted rows but cleared flags).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn create(&self, new: &NewAddress) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if new.is_default {
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE, updated_at = NOW() \
                 WHERE user_id = $1 AND is_default",
            )
            .bind(&new.user_id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(
            "INSERT INTO addresses \
                 (user_id, name, email, phone, address_line1, address_line2, city, state, \
                  postal_code, country, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING id, user_id, name, email, phone, address_line1, address_line2, city, \
                       state, postal_code, country, is_default, created_at, updated_at",
        )
        .bind(&new.user_id)
        .bind(&new.name)
        .bind(new.email.as_ref())
        .bind(&new.phone)
        .bind(&new.address_line1)
        .bind(&new.address_line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.postal_code)
        .bind(&new.country)
        .bind(new.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_address()
    }
}
