//! User repository for the email-OTP flow.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use driftwood_core::{Email, Mobile, OtpCode, UserId};

use super::RepositoryError;
use crate::models::User;

/// Name of the partial unique index on `users.mobile`.
///
/// The index ignores NULL rows (many accounts without a mobile) while
/// enforcing uniqueness for accounts that have one.
const MOBILE_UNIQUE_INDEX: &str = "users_mobile_unique_idx";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    mobile: Option<String>,
    otp: Option<String>,
    otp_expires: Option<DateTime<Utc>>,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let mobile = match self.mobile {
            Some(raw) => Some(Mobile::parse(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid mobile in database: {e}"))
            })?),
            None => None,
        };
        let otp = match self.otp {
            Some(raw) => Some(OtpCode::parse(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid OTP in database: {e}"))
            })?),
            None => None,
        };

        Ok(User {
            id: UserId::new(self.id),
            email,
            mobile,
            otp,
            otp_expires: self.otp_expires,
            is_verified: self.is_verified,
            created_at: self.created_at,
        })
    }
}

const SELECT_USER: &str =
    "SELECT id, email, mobile, otp, otp_expires, is_verified, created_at FROM users";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for unreadable stored values.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create or update a user by email, adopting the submitted mobile.
    ///
    /// Single upsert round trip: a new email inserts a fresh account; an
    /// existing one keeps its row and takes the new mobile when one was
    /// submitted (otherwise the stored mobile is left alone).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the mobile is already linked
    /// to a different account (the sparse unique index fires), or
    /// `RepositoryError::Database` for other failures.
    pub async fn upsert_contact(
        &self,
        email: &Email,
        mobile: Option<&Mobile>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, mobile) VALUES ($1, $2) \
             ON CONFLICT (email) \
             DO UPDATE SET mobile = COALESCE(EXCLUDED.mobile, users.mobile) \
             RETURNING id, email, mobile, otp, otp_expires, is_verified, created_at",
        )
        .bind(email)
        .bind(mobile)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
                && db_err.constraint() == Some(MOBILE_UNIQUE_INDEX)
            {
                return RepositoryError::Conflict(
                    "This mobile number is already linked to another account.".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Store a freshly issued OTP and its expiry on a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn set_otp(
        &self,
        id: UserId,
        code: &OtpCode,
        expires: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET otp = $2, otp_expires = $3 WHERE id = $1")
            .bind(id)
            .bind(code)
            .bind(expires)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark a user verified and clear the OTP fields.
    ///
    /// Clearing both fields in the same statement is what makes a code
    /// single-use: a second verification attempt with the same code finds
    /// nothing to match against.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, otp = NULL, otp_expires = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
