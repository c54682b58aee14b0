//! Mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Mobile`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum MobileError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input string is too short or too long.
    #[error("mobile number must be {min}-{max} digits")]
    BadLength {
        /// Minimum number of digits.
        min: usize,
        /// Maximum number of digits.
        max: usize,
    },
    /// The input contains characters other than digits, spaces, or a leading +.
    #[error("mobile number may only contain digits, spaces, and a leading +")]
    InvalidCharacter,
}

/// A mobile phone number.
///
/// Backs the sparse-unique `users.mobile` column: users without a mobile
/// simply store NULL, while any stored value must be unique across accounts.
/// Stored in a canonical form with spaces removed, so the uniqueness check
/// is not defeated by formatting differences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Mobile(String);

impl Mobile {
    /// Minimum number of digits in a mobile number.
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits in a mobile number (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Mobile` from a string.
    ///
    /// Trims whitespace, removes interior spaces, and keeps an optional
    /// leading `+`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other than
    /// digits/spaces/a leading `+`, or has an out-of-range digit count.
    pub fn parse(s: &str) -> Result<Self, MobileError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MobileError::Empty);
        }

        let mut canonical = String::with_capacity(trimmed.len());
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '0'..='9' => canonical.push(c),
                '+' if i == 0 => canonical.push(c),
                ' ' => {}
                _ => return Err(MobileError::InvalidCharacter),
            }
        }

        let digits = canonical.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(MobileError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(canonical))
    }

    /// Returns the mobile number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Mobile` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Mobile {
    type Err = MobileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Mobile {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Mobile {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Mobile {
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
    fn test_parse_valid_numbers() {
        assert_eq!(Mobile::parse("9876543210").unwrap().as_str(), "9876543210");
        assert_eq!(
            Mobile::parse("+91 98765 43210").unwrap().as_str(),
            "+919876543210"
        );
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert!(matches!(
            Mobile::parse("98765abcde"),
            Err(MobileError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_rejects_interior_plus() {
        assert!(matches!(
            Mobile::parse("98+76543210"),
            Err(MobileError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            Mobile::parse("123456"),
            Err(MobileError::BadLength { .. })
        ));
        assert!(matches!(
            Mobile::parse("1234567890123456"),
            Err(MobileError::BadLength { .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Mobile::parse("  "), Err(MobileError::Empty)));
    }

    #[test]
    fn test_formatting_variants_are_equal() {
        assert_eq!(
            Mobile::parse("+1 415 555 0100").unwrap(),
            Mobile::parse("+14155550100").unwrap()
        );
    }
}
