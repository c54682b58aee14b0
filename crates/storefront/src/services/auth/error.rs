//! Authentication error types.

use driftwood_core::{EmailError as EmailParseError, MobileError};

use crate::db::RepositoryError;
use crate::services::email::EmailError;
use crate::services::token::TokenError;

/// Errors that can occur during the OTP flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No email in the request.
    #[error("Email is required")]
    MissingEmail,

    /// The submitted email failed validation.
    #[error("{0}")]
    InvalidEmail(#[from] EmailParseError),

    /// The submitted mobile failed validation.
    #[error("{0}")]
    InvalidMobile(#[from] MobileError),

    /// The submitted mobile is already linked to a different account.
    #[error("This mobile number is already linked to another account.")]
    MobileLinked,

    /// Verification failed: unknown user, wrong code, or expired code.
    ///
    /// One variant for all three on purpose - the response must not reveal
    /// which part was wrong.
    #[error("Invalid or expired OTP")]
    InvalidOtp,

    /// The OTP email could not be dispatched.
    #[error(transparent)]
    Delivery(#[from] EmailError),

    /// The session token could not be signed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(RepositoryError),
}
