//! Domain types for the storefront backend API.
//!
//! These types provide a clean, ergonomic API separate from the raw JSON
//! payloads the backend returns. Every record is produced by a lenient
//! normalizer in [`super::normalize`], so fields always have a value even
//! when the wire payload omitted them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kirana_core::{OrderId, Phone, PriceRange, ProductId, RewardId, VariantId, VariantKey};

use crate::ledger::{Address, CartLine, ShippingMethod};

// =============================================================================
// Catalog Types
// =============================================================================

/// A purchasable configuration of a product (e.g., a pack size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Backend variant ID; absent for ad hoc/legacy products.
    pub id: Option<VariantId>,
    /// Human-readable size/pack name.
    pub label: String,
    /// Regular unit price.
    pub price: Decimal,
    /// Discounted unit price, when on sale.
    pub sale_price: Option<Decimal>,
    /// Variant image; falls back to the parent product image.
    pub image: String,
    /// Purchasable quantity ceiling; `None` means unconstrained.
    pub stock: Option<u32>,
}

impl Variant {
    /// Structural fingerprint used for cart line identity.
    #[must_use]
    pub const fn key(&self) -> VariantKey {
        VariantKey::new(self.price, self.sale_price)
    }

    /// The price a buyer actually pays for one unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }
}

/// A catalog product, read-only from the client's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Backend product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Brand name; empty when the backend omits it.
    pub brand: String,
    /// Category name; empty when the backend omits it.
    pub category: String,
    /// Primary image reference.
    pub image: String,
    /// All image references.
    pub images: Vec<String>,
    /// Average rating; 0 when unrated.
    pub rating: f64,
    /// Loyalty points earned per unit.
    pub points: i64,
    /// Single authoritative price, when the product has one.
    pub regular_price: Option<Decimal>,
    /// Discounted price for single-price products.
    pub sale_price: Option<Decimal>,
    /// Normalized purchasable variants.
    pub variants: Vec<Variant>,
    /// Effective-price span across variants, when the product has 2+
    /// variants at differing prices and no usable single price.
    pub price_range: Option<PriceRange>,
}

/// A promotional banner for the home screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub image: String,
    /// Optional navigation target (product or category reference).
    pub target: Option<String>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// A brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// A reward redeemable with loyalty points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub title: String,
    pub description: String,
    /// Points required to redeem.
    pub points_cost: i64,
    pub image: String,
}

// =============================================================================
// Order Types
// =============================================================================

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    /// Unit price actually charged.
    pub price: Decimal,
}

/// A placed order as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Owning user's phone, as the backend reports it.
    pub user: String,
    /// Backend status label (e.g., "placed", "shipped", "delivered").
    pub status: String,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    /// Placement time; `None` when the backend omits or mangles it.
    pub created_at: Option<DateTime<Utc>>,
}

/// One line of an order being placed.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub pack_label: String,
    pub quantity: u32,
    /// Effective unit price at checkout time.
    pub unit_price: Decimal,
    /// Loyalty points per unit.
    pub points: i64,
}

/// The checkout payload POSTed to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user: Phone,
    pub lines: Vec<NewOrderLine>,
    pub address: Address,
    pub shipping: ShippingMethod,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub points_earned: i64,
    pub points_redeemed: i64,
}

impl NewOrder {
    /// Assemble an order from the user's cart lines and checkout
    /// selections. Totals are computed over effective prices.
    #[must_use]
    pub fn from_checkout(
        user: Phone,
        lines: &[CartLine],
        address: Address,
        shipping: ShippingMethod,
        points_redeemed: i64,
    ) -> Self {
        let subtotal: Decimal = lines
            .iter()
            .map(|line| line.effective_price() * Decimal::from(line.quantity))
            .sum();
        let points_earned: i64 = lines
            .iter()
            .map(|line| line.points * i64::from(line.quantity))
            .sum();
        let shipping_fee = shipping.fee;

        Self {
            user,
            lines: lines
                .iter()
                .map(|line| NewOrderLine {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    pack_label: line.pack_label.clone(),
                    quantity: line.quantity,
                    unit_price: line.effective_price(),
                    points: line.points,
                })
                .collect(),
            address,
            shipping,
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
            points_earned,
            points_redeemed,
        }
    }
}
