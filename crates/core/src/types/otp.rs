//! One-time password code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpError {
    /// The input string is empty.
    #[error("OTP cannot be empty")]
    Empty,
    /// The input is not exactly six ASCII digits.
    #[error("OTP must be exactly {0} digits")]
    BadFormat(usize),
}

/// A six-digit one-time password.
///
/// Codes are compared for exact string equality, so a leading zero is
/// significant: `012345` and `12345` are different codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse an `OtpCode` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or is not exactly
    /// [`Self::LENGTH`] ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OtpError::Empty);
        }
        if trimmed.len() != Self::LENGTH || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::BadFormat(Self::LENGTH));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Build a code from a number in `0..1_000_000`, zero-padded to six digits.
    ///
    /// Values at or above one million wrap modulo 1_000_000.
    #[must_use]
    pub fn from_number(n: u32) -> Self {
        Self(format!("{:06}", n % 1_000_000))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OtpCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OtpCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OtpCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(OtpCode::parse("123456").unwrap().as_str(), "123456");
        assert_eq!(OtpCode::parse(" 012345 ").unwrap().as_str(), "012345");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            OtpCode::parse("12345"),
            Err(OtpError::BadFormat(6))
        ));
        assert!(matches!(
            OtpCode::parse("1234567"),
            Err(OtpError::BadFormat(6))
        ));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(matches!(
            OtpCode::parse("12a456"),
            Err(OtpError::BadFormat(6))
        ));
    }

    #[test]
    fn test_from_number_pads_and_wraps() {
        assert_eq!(OtpCode::from_number(42).as_str(), "000042");
        assert_eq!(OtpCode::from_number(999_999).as_str(), "999999");
        assert_eq!(OtpCode::from_number(1_000_001).as_str(), "000001");
    }

    #[test]
    fn test_leading_zero_is_significant() {
        assert_ne!(
            OtpCode::parse("012345").unwrap(),
            OtpCode::parse("123450").unwrap()
        );
    }
}
