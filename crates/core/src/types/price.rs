//! Price types: variant fingerprints and price ranges.
//!
//! Monetary values use decimal arithmetic throughout; floats never touch
//! prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structural identity of a purchasable variant.
///
/// A cart line is identified by its product ID plus this fingerprint: two
/// lines are the same line exactly when the product matches and the
/// `{price, sale_price}` pair matches field-for-field. Deriving `Eq`/`Hash`
/// makes the comparison order-independent and insensitive to how the pair
/// was serialized, while an absent fingerprint (`Option::None` at the call
/// site) still compares equal to another absent fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    /// Regular unit price.
    pub price: Decimal,
    /// Discounted unit price, when the variant is on sale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
}

impl VariantKey {
    /// Create a new fingerprint.
    #[must_use]
    pub const fn new(price: Decimal, sale_price: Option<Decimal>) -> Self {
        Self { price, sale_price }
    }

    /// The price a buyer actually pays: the sale price when one is set,
    /// otherwise the regular price.
    #[must_use]
    pub fn effective(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }
}

/// Min/max span of effective prices across a product's variants.
///
/// Shown on product cards when a product has several variants at different
/// prices and no single authoritative price of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest effective price among the variants.
    pub min: Decimal,
    /// Highest effective price among the variants.
    pub max: Decimal,
}

impl PriceRange {
    /// Compute the span of a set of effective prices.
    ///
    /// Returns `None` for fewer than two prices or when all prices are
    /// equal - a single-value range is "no range" and callers fall back to
    /// the normal single-price display path.
    #[must_use]
    pub fn spanning(prices: &[Decimal]) -> Option<Self> {
        if prices.len() < 2 {
            return None;
        }
        let min = prices.iter().min().copied()?;
        let max = prices.iter().max().copied()?;
        if min == max {
            return None;
        }
        Some(Self { min, max })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_variant_key_equality_is_structural() {
        let a = VariantKey::new(d(100), Some(d(90)));
        let b = VariantKey::new(d(100), Some(d(90)));
        assert_eq!(a, b);

        let c = VariantKey::new(d(100), None);
        assert_ne!(a, c);

        let e = VariantKey::new(d(150), Some(d(90)));
        assert_ne!(a, e);
    }

    #[test]
    fn test_variant_key_effective_price() {
        assert_eq!(VariantKey::new(d(100), Some(d(90))).effective(), d(90));
        assert_eq!(VariantKey::new(d(100), None).effective(), d(100));
    }

    #[test]
    fn test_spanning_requires_two_prices() {
        assert!(PriceRange::spanning(&[]).is_none());
        assert!(PriceRange::spanning(&[d(50)]).is_none());
    }

    #[test]
    fn test_spanning_collapses_equal_prices() {
        assert!(PriceRange::spanning(&[d(50), d(50), d(50)]).is_none());
    }

    #[test]
    fn test_spanning_orders_min_max() {
        let range = PriceRange::spanning(&[d(120), d(45), d(80)]).unwrap();
        assert_eq!(range.min, d(45));
        assert_eq!(range.max, d(120));
        assert!(range.min <= range.max);
    }

    #[test]
    fn test_spanning_fractional_prices() {
        // 45.50 vs 45.5 normalize to the same value
        let a = Decimal::new(4550, 2);
        let b = Decimal::new(455, 1);
        assert!(PriceRange::spanning(&[a, b]).is_none());

        let range = PriceRange::spanning(&[a, d(46)]).unwrap();
        assert_eq!(range.min, a);
        assert_eq!(range.max, d(46));
    }

    #[test]
    fn test_variant_key_serde_roundtrip() {
        let key = VariantKey::new(d(100), Some(d(90)));
        let json = serde_json::to_string(&key).unwrap();
        let parsed: VariantKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);

        // sale_price is omitted entirely when absent
        let bare = VariantKey::new(d(100), None);
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("sale_price"));
    }
}
