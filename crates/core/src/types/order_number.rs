//! Human-facing order number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderNumberError {
    /// The input string is empty.
    #[error("order number cannot be empty")]
    Empty,
    /// The input does not look like `ORD-<base36>-<base36>`.
    #[error("order number must look like ORD-XXXXXXXX-XXXX")]
    BadFormat,
}

/// A human-facing order reference.
///
/// Format: `ORD-<timestamp>-<suffix>`, where `<timestamp>` is the creation
/// time in Unix milliseconds rendered in uppercase base36 and `<suffix>` is a
/// random value below one million, also base36, zero-padded to four
/// characters. The combination is effectively unique but not guaranteed:
/// the `orders.order_number` unique constraint is the backstop, and a
/// collision on insert surfaces as a conflict rather than being retried.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

/// Prefix on every order number.
const PREFIX: &str = "ORD";

/// Render `n` in uppercase base36.
fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        let d = usize::try_from(n % 36).unwrap_or(0);
        out.push(DIGITS.get(d).copied().unwrap_or(b'0'));
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

impl OrderNumber {
    /// Build an order number from a creation timestamp and a random suffix.
    ///
    /// The suffix wraps modulo one million to match its four-character
    /// base36 budget.
    #[must_use]
    pub fn from_parts(timestamp_millis: u64, suffix: u32) -> Self {
        let stamp = to_base36(timestamp_millis);
        let suffix = format!("{:0>4}", to_base36(u64::from(suffix % 1_000_000)));
        Self(format!("{PREFIX}-{stamp}-{suffix}"))
    }

    /// Parse an `OrderNumber` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or does not match the
    /// `ORD-<base36>-<base36>` shape.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OrderNumberError::Empty);
        }

        let mut parts = trimmed.split('-');
        let is_base36 =
            |seg: &str| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(PREFIX), Some(stamp), Some(suffix), None)
                if is_base36(stamp) && is_base36(suffix) =>
            {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(OrderNumberError::BadFormat),
        }
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
