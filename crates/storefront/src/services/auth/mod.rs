//! Email-OTP authentication service.
//!
//! `send_otp` upserts the account, stores a fresh six-digit code with a
//! five-minute expiry, and mails it. `verify_otp` accepts the code exactly
//! once before expiry, marks the account verified, and hands back a signed
//! session token.

mod error;

pub use error::AuthError;

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;

use driftwood_core::{Email, Mobile, OtpCode};

use crate::db::{RepositoryError, UserRepository};
use crate::services::email::EmailService;
use crate::services::token::{IssuedToken, TokenSigner};

/// How long an issued OTP stays valid.
const OTP_TTL_MINUTES: i64 = 5;

/// Generate a random six-digit code (no leading zero).
fn generate_otp() -> OtpCode {
    OtpCode::from_number(rand::rng().random_range(100_000..1_000_000))
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    email: &'a EmailService,
    tokens: &'a TokenSigner,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService, tokens: &'a TokenSigner) -> Self {
        Self {
            users: UserRepository::new(pool),
            email,
            tokens,
        }
    }

    /// Issue an OTP to the given email, optionally linking a mobile number.
    ///
    /// The account is created on first contact. The code is persisted before
    /// dispatch, so a failed send can be retried by requesting a new code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MobileLinked`] when the mobile belongs to a
    /// different account, [`AuthError::Delivery`] when the mail bounces at
    /// the transport.
    pub async fn send_otp(
        &self,
        email_raw: &str,
        mobile_raw: Option<&str>,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email_raw)?;
        let mobile = match mobile_raw.map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Some(Mobile::parse(raw)?),
            None => None,
        };

        let user = self
            .users
            .upsert_contact(&email, mobile.as_ref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::MobileLinked,
                other => AuthError::Repository(other),
            })?;

        let code = generate_otp();
        let expires = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        self.users
            .set_otp(user.id, &code, expires)
            .await
            .map_err(AuthError::Repository)?;

        self.email.send_otp_code(&email, &code).await?;

        tracing::info!(user_id = %user.id, "OTP issued");
        Ok(())
    }

    /// Verify a submitted OTP and issue a session token.
    ///
    /// Success requires an existing account, an exact code match, and an
    /// unexpired code. The stored code is cleared on success, so it cannot
    /// be replayed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidOtp`] for any verification failure.
    pub async fn verify_otp(
        &self,
        email_raw: &str,
        otp_raw: &str,
    ) -> Result<IssuedToken, AuthError> {
        let email = Email::parse(email_raw)?;
        // A code with the wrong shape can never match a stored one.
        let code = OtpCode::parse(otp_raw).map_err(|_| AuthError::InvalidOtp)?;

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(AuthError::Repository)?
            .ok_or(AuthError::InvalidOtp)?;

        if !user.otp_matches(&code, Utc::now()) {
            return Err(AuthError::InvalidOtp);
        }

        self.users
            .mark_verified(user.id)
            .await
            .map_err(AuthError::Repository)?;

        let token = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = %user.id, "OTP verified");
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_otp_is_six_digits_without_leading_zero() {
        for _ in 0..64 {
            let code = generate_otp();
            assert_eq!(code.as_str().len(), 6);
            assert!(!code.as_str().starts_with('0'));
            assert!(OtpCode::parse(code.as_str()).is_ok());
        }
    }
}
