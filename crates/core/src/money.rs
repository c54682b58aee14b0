//! Line-pricing arithmetic.
//!
//! Prices are `rust_decimal::Decimal` everywhere so totals are exact; cart
//! and order lines snapshot the product price at the time of the operation,
//! and these helpers are the single place where snapshots are combined into
//! subtotals and totals.

use rust_decimal::Decimal;

/// Compute a line subtotal: `price × quantity`.
#[must_use]
pub fn line_subtotal(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Sum line subtotals into an order or cart total.
pub fn total<I: IntoIterator<Item = Decimal>>(subtotals: I) -> Decimal {
    subtotals.into_iter().sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line_subtotal(dec("100"), 3), dec("300"));
        assert_eq!(line_subtotal(dec("19.99"), 2), dec("39.98"));
        assert_eq!(line_subtotal(dec("0"), 5), dec("0"));
    }

    #[test]
    fn test_total_sums_subtotals() {
        let sum = total([dec("300"), dec("39.98"), dec("0.02")]);
        assert_eq!(sum, dec("340.00"));
    }

    #[test]
    fn test_total_of_nothing_is_zero() {
        assert_eq!(total(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_no_float_drift() {
        // 0.1 * 3 is exactly 0.3 in decimal arithmetic.
        assert_eq!(line_subtotal(dec("0.1"), 3), dec("0.3"));
    }
}
