//! User domain types.
//!
//! Users exist only for the email-OTP login flow; carts, orders, and
//! addresses are keyed by the client-supplied shopper ID instead.

use chrono::{DateTime, Utc};

use driftwood_core::{Email, Mobile, OtpCode, UserId};

/// A storefront user account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address (unique).
    pub email: Email,
    /// Optional mobile number (unique when present - sparse index).
    pub mobile: Option<Mobile>,
    /// Outstanding one-time password, if one has been issued.
    pub otp: Option<OtpCode>,
    /// When the outstanding OTP stops being accepted.
    pub otp_expires: Option<DateTime<Utc>>,
    /// Whether the user has completed OTP verification at least once.
    pub is_verified: bool,
    /// When the account was first seen.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether `submitted` is the outstanding OTP and it has not expired.
    ///
    /// Exact string match: a cleared code (post-verification) never matches,
    /// and expiry is checked against the caller's clock so the decision is
    /// testable.
    #[must_use]
    pub fn otp_matches(&self, submitted: &OtpCode, now: DateTime<Utc>) -> bool {
        match (&self.otp, self.otp_expires) {
            (Some(code), Some(expires)) => code == submitted && now < expires,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(otp: Option<&str>, expires_in: Option<Duration>, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("shopper@example.com").unwrap(),
            mobile: None,
            otp: otp.map(|c| OtpCode::parse(c).unwrap()),
            otp_expires: expires_in.map(|d| now + d),
            is_verified: false,
            created_at: now,
        }
    }

    #[test]
    fn test_matching_code_before_expiry() {
        let now = Utc::now();
        let user = user(Some("123456"), Some(Duration::minutes(5)), now);
        assert!(user.otp_matches(&OtpCode::parse("123456").unwrap(), now));
    }

    #[test]
    fn test_correct_code_after_expiry_fails() {
        let now = Utc::now();
        let user = user(Some("123456"), Some(Duration::minutes(5)), now);
        let later = now + Duration::minutes(6);
        assert!(!user.otp_matches(&OtpCode::parse("123456").unwrap(), later));
    }

    #[test]
    fn test_wrong_code_fails() {
        let now = Utc::now();
        let user = user(Some("123456"), Some(Duration::minutes(5)), now);
        assert!(!user.otp_matches(&OtpCode::parse("654321").unwrap(), now));
    }

    #[test]
    fn test_cleared_code_never_matches() {
        let now = Utc::now();
        let user = user(None, None, now);
        assert!(!user.otp_matches(&OtpCode::parse("123456").unwrap(), now));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let user = user(Some("123456"), Some(Duration::zero()), now);
        // now == otp_expires: already expired
        assert!(!user.otp_matches(&OtpCode::parse("123456").unwrap(), now));
    }
}
