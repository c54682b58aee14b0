//! Cart domain types and line arithmetic.

use rust_decimal::Decimal;
use serde::Serialize;

use driftwood_core::{ProductId, ShopperId, money};

/// A single cart line, enriched with the product's primary image.
///
/// `name` and `price` are snapshots taken when the line was added; editing
/// the product afterwards does not change an existing cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: Option<String>,
}

/// The cart shape returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: ShopperId,
    pub items: Vec<CartLine>,
    pub total: Decimal,
}

impl CartView {
    /// Build a view from lines, computing the total.
    #[must_use]
    pub fn new(user_id: ShopperId, items: Vec<CartLine>) -> Self {
        let total = money::total(
            items
                .iter()
                .map(|line| money::line_subtotal(line.price, line.quantity)),
        );
        Self {
            user_id,
            items,
            total,
        }
    }

    /// The shape returned when a shopper has no cart yet.
    #[must_use]
    pub fn empty(user_id: ShopperId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

/// A requested adjustment to an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// Bump the quantity by one.
    Increase,
    /// Drop the quantity by one.
    Decrease,
    /// Replace the quantity outright.
    Set(u32),
}

impl LineChange {
    /// Apply the change to a line's current quantity.
    ///
    /// Returns the new quantity, or `None` when the resulting quantity is
    /// zero or below and the line should be removed from the cart.
    #[must_use]
    pub const fn resolve(self, current: u32) -> Option<u32> {
        let next = match self {
            Self::Increase => current.saturating_add(1),
            Self::Decrease => current.saturating_sub(1),
            Self::Set(quantity) => quantity,
        };
        if next == 0 { None } else { Some(next) }
    }
}
