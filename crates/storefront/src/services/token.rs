//! Session token signing.
//!
//! Successful OTP verification issues a stateless, HMAC-SHA256-signed token
//! valid for seven days: `base64url(claims JSON) . base64url(mac)`. Nothing
//! about the session is stored server-side; verification recomputes the MAC
//! and checks the embedded expiry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use driftwood_core::{Email, UserId};

type HmacSha256 = Hmac<Sha256>;

/// How long an issued session token stays valid.
const SESSION_TTL_DAYS: i64 = 7;

/// Errors that can occur when signing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The signing key was rejected by the MAC implementation.
    #[error("token signing key rejected")]
    Key,

    /// The claims could not be serialized or parsed.
    #[error("malformed token")]
    Malformed,

    /// The signature did not match the payload.
    #[error("token signature mismatch")]
    BadSignature,

    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,
}

/// The claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID the session belongs to.
    pub sub: UserId,
    /// Email at issue time.
    pub email: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
}

/// A freshly issued token plus its expiry, for the response payload.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::Key)
    }

    /// Issue a seven-day session token for a verified user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Key`] if the signing key is unusable.
    pub fn issue(&self, user: UserId, email: &Email) -> Result<IssuedToken, TokenError> {
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
        let claims = SessionClaims {
            sub: user,
            email: email.as_str().to_owned(),
            exp: expires_at.timestamp(),
        };
        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_at,
        })
    }

    /// Sign claims into a token string.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Key`] or [`TokenError::Malformed`].
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Verify a token against the current clock and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] for a token that does not split
    /// into payload and signature, [`TokenError::BadSignature`] when the
    /// MAC does not match (constant-time comparison), and
    /// [`TokenError::Expired`] past the embedded expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(SecretString::from("kJ8vQ2xR9mT4wN7pL1cF6hD3sG5bZ0yA"))
    }

    fn email() -> Email {
        Email::parse("shopper@example.com").unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let signer = signer();
        let issued = signer.issue(UserId::new(7), &email()).unwrap();

        let claims = signer.verify(&issued.token, Utc::now()).unwrap();
        assert_eq!(claims.sub, UserId::new(7));
        assert_eq!(claims.email, "shopper@example.com");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_expiry_is_seven_days_out() {
        let issued = signer().issue(UserId::new(7), &email()).unwrap();
        let remaining = issued.expires_at - Utc::now();
        assert!(remaining <= Duration::days(7));
        assert!(remaining > Duration::days(7) - Duration::minutes(1));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = signer();
        let issued = signer.issue(UserId::new(7), &email()).unwrap();

        let (_, signature) = issued.token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&SessionClaims {
                sub: UserId::new(999),
                email: "attacker@example.com".to_owned(),
                exp: i64::MAX,
            })
            .unwrap(),
        );
        let forged = format!("{forged_payload}.{signature}");

        assert!(matches!(
            signer.verify(&forged, Utc::now()),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = signer().issue(UserId::new(7), &email()).unwrap();
        let other = TokenSigner::new(SecretString::from("aB3dE5fG7hJ9kL1mN3pQ5rS7tU9vW1xY"));
        assert!(matches!(
            other.verify(&issued.token, Utc::now()),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        let claims = SessionClaims {
            sub: UserId::new(7),
            email: "shopper@example.com".to_owned(),
            exp: Utc::now().timestamp() - 10,
        };
        let token = signer.sign(&claims).unwrap();
        assert!(matches!(
            signer.verify(&token, Utc::now()),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_garbage_tokens_are_malformed() {
        let signer = signer();
        assert!(matches!(
            signer.verify("not-a-token", Utc::now()),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            signer.verify("a.b.c", Utc::now()),
            Err(TokenError::Malformed) | Err(TokenError::BadSignature)
        ));
    }
}
