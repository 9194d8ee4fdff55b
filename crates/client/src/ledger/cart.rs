//! Cart ledger: ordered cart lines, merged by product + variant identity.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use kirana_core::{Phone, ProductId, VariantKey};

use crate::storage::KeyValueStore;

/// Storage key for the cart collection. Global: lines carry their owner
/// and screens filter at display time.
const CART_KEY: &str = "cart";

/// One cart line: "this user intends to purchase N units of product P at
/// variant V".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product display name.
    pub name: String,
    /// Pack/variant label (e.g., "5 kg").
    pub pack_label: String,
    /// Regular unit price.
    pub price: Decimal,
    /// Discounted unit price, when on sale.
    pub sale_price: Option<Decimal>,
    /// Loyalty points earned per unit.
    pub points: i64,
    /// Units to purchase; never below 1.
    pub quantity: u32,
    /// Purchasable ceiling; `None` means unconstrained.
    pub stock: Option<u32>,
    /// Line image.
    pub image: String,
    /// Owning user.
    pub owner: Phone,
    /// Variant fingerprint; `None` for single-price products. Part of the
    /// line's identity.
    pub variant: Option<VariantKey>,
}

impl CartLine {
    /// The price a buyer actually pays for one unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    /// Identity match: same product and same variant fingerprint. Two
    /// absent fingerprints count as equal.
    fn matches(&self, product_id: &ProductId, variant: Option<VariantKey>) -> bool {
        self.product_id == *product_id && self.variant == variant
    }
}

/// Totals over one owner's lines, for the cart and checkout screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of effective price times quantity.
    pub subtotal: Decimal,
    /// Loyalty points the order would earn.
    pub points: i64,
    /// Total units across lines.
    pub item_count: u64,
}

/// The cart ledger.
///
/// Holds every user's lines (the collection is keyed globally); mutations
/// take the ledger mutex, apply in memory, and mirror the whole
/// collection back to the store before releasing it.
pub struct CartLedger {
    store: Arc<dyn KeyValueStore>,
    lines: Mutex<Vec<CartLine>>,
}

impl CartLedger {
    /// Create a ledger over the given store. State starts empty; call
    /// [`load`](Self::load) before first display.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Replace in-memory state from the store.
    ///
    /// Nothing stored leaves the current state untouched; a read or
    /// decode failure is logged and treated as an empty cart.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let mut lines = self.lines.lock().await;
        match self.store.get(CART_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<CartLine>>(value) {
                Ok(stored) => *lines = stored,
                Err(e) => {
                    warn!(error = %e, "stored cart is not decodable, starting empty");
                    lines.clear();
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "cart load failed, starting empty");
                lines.clear();
            }
        }
    }

    /// Add a line, merging with an existing line of the same identity.
    ///
    /// A merged line gains the incoming quantity; an appended line gets
    /// its quantity, in both cases with zero treated as 1.
    #[instrument(skip(self, line), fields(product_id = %line.product_id))]
    pub async fn add(&self, line: CartLine) {
        let mut lines = self.lines.lock().await;
        let incoming = line.quantity.max(1);

        if let Some(existing) = lines
            .iter_mut()
            .find(|l| l.matches(&line.product_id, line.variant))
        {
            existing.quantity = existing.quantity.saturating_add(incoming);
        } else {
            let mut line = line;
            line.quantity = incoming;
            lines.push(line);
        }

        self.persist(&lines).await;
    }

    /// Adjust a line's quantity by `delta`, clamped to a minimum of 1.
    ///
    /// Quantity can never be driven below 1 here; use
    /// [`remove`](Self::remove) for zero/negative intent. No-op when no
    /// line matches.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        delta: i64,
        variant: Option<VariantKey>,
    ) {
        let mut lines = self.lines.lock().await;

        let Some(line) = lines.iter_mut().find(|l| l.matches(product_id, variant)) else {
            return;
        };

        let next = i64::from(line.quantity).saturating_add(delta).max(1);
        line.quantity = u32::try_from(next).unwrap_or(u32::MAX);

        self.persist(&lines).await;
    }

    /// Remove the line with exactly this identity.
    ///
    /// Removal requires an exact product + fingerprint match; a miss is a
    /// no-op rather than falling back to an id-only match, which could
    /// drop a sibling variant's line.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: &ProductId, variant: Option<VariantKey>) {
        let mut lines = self.lines.lock().await;

        let before = lines.len();
        lines.retain(|l| !l.matches(product_id, variant));

        if lines.len() == before {
            warn!(%product_id, "remove matched no cart line");
            return;
        }

        self.persist(&lines).await;
    }

    /// The given owner's lines, in insertion order. Lines belonging to
    /// other accounts on the same device stay stored but hidden.
    pub async fn lines_for(&self, owner: &Phone) -> Vec<CartLine> {
        self.lines
            .lock()
            .await
            .iter()
            .filter(|l| l.owner == *owner)
            .cloned()
            .collect()
    }

    /// Totals over the given owner's lines.
    pub async fn totals_for(&self, owner: &Phone) -> CartTotals {
        let lines = self.lines.lock().await;
        let mut totals = CartTotals::default();

        for line in lines.iter().filter(|l| l.owner == *owner) {
            totals.subtotal += line.effective_price() * Decimal::from(line.quantity);
            totals.points += line.points * i64::from(line.quantity);
            totals.item_count += u64::from(line.quantity);
        }

        totals
    }

    /// Drop all of an owner's lines (after a successful checkout).
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn clear_for(&self, owner: &Phone) {
        let mut lines = self.lines.lock().await;
        lines.retain(|l| l.owner != *owner);
        self.persist(&lines).await;
    }

    /// Mirror the collection to the store. Failures degrade to a logged
    /// no-op; in-memory state stays authoritative for the session.
    async fn persist(&self, lines: &[CartLine]) {
        match serde_json::to_value(lines) {
            Ok(value) => {
                if let Err(e) = self.store.set(CART_KEY, value).await {
                    warn!(error = %e, "cart persist failed");
                }
            }
            Err(e) => warn!(error = %e, "cart serialize failed"),
        }
    }
}
