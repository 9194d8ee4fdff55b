//! Wishlist ledger: a per-phone set of product references.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use kirana_core::{Phone, ProductId, VariantKey};

use crate::storage::KeyValueStore;

/// One wishlist entry: "this user is interested in product P, optionally
/// at variant V". Identity is the product id alone - variant details are
/// display detail, never part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image: String,
    pub category: Option<String>,
    /// Variant the user was looking at when they saved the product.
    pub variant_label: Option<String>,
    pub variant: Option<VariantKey>,
}

struct WishlistState {
    phone: Option<Phone>,
    entries: Vec<WishlistEntry>,
}

/// The wishlist ledger, scoped by an explicitly set current phone.
///
/// Each phone has its own storage key, so switching accounts on one
/// device swaps the entire visible collection on the next
/// [`load`](Self::load).
pub struct WishlistLedger {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<WishlistState>,
}

impl WishlistLedger {
    /// Create a ledger over the given store with no phone scoped yet.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: Mutex::new(WishlistState {
                phone: None,
                entries: Vec::new(),
            }),
        }
    }

    fn storage_key(phone: &Phone) -> String {
        format!("wishlist_{phone}")
    }

    /// Set (or clear, on logout) the scoping phone. Does not itself
    /// reload data - call [`load`](Self::load) afterward.
    pub async fn set_phone(&self, phone: Option<Phone>) {
        self.state.lock().await.phone = phone;
    }

    /// Replace in-memory state from the current phone's storage key.
    ///
    /// No-op without a phone. Resets to empty when nothing is stored, so
    /// a freshly scoped phone never sees the previous account's entries.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let mut state = self.state.lock().await;
        let Some(phone) = state.phone.clone() else {
            return;
        };

        match self.store.get(&Self::storage_key(&phone)).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<WishlistEntry>>(value) {
                Ok(stored) => state.entries = stored,
                Err(e) => {
                    warn!(error = %e, "stored wishlist is not decodable, starting empty");
                    state.entries.clear();
                }
            },
            Ok(None) => state.entries.clear(),
            Err(e) => {
                warn!(error = %e, "wishlist load failed, starting empty");
                state.entries.clear();
            }
        }
    }

    /// Add an entry. No-op without a phone; adding a product id already
    /// present is a no-op regardless of variant differences.
    #[instrument(skip(self, entry), fields(product_id = %entry.product_id))]
    pub async fn add(&self, entry: WishlistEntry) {
        let mut state = self.state.lock().await;
        let Some(phone) = state.phone.clone() else {
            return;
        };

        if state
            .entries
            .iter()
            .any(|e| e.product_id == entry.product_id)
        {
            return;
        }

        state.entries.push(entry);
        self.persist(&phone, &state.entries).await;
    }

    /// Remove every entry with the given product id. No-op without a
    /// phone.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: &ProductId) {
        let mut state = self.state.lock().await;
        let Some(phone) = state.phone.clone() else {
            return;
        };

        state.entries.retain(|e| e.product_id != *product_id);
        self.persist(&phone, &state.entries).await;
    }

    /// Snapshot of the current phone's entries.
    pub async fn entries(&self) -> Vec<WishlistEntry> {
        self.state.lock().await.entries.clone()
    }

    async fn persist(&self, phone: &Phone, entries: &[WishlistEntry]) {
        match serde_json::to_value(entries) {
            Ok(value) => {
                if let Err(e) = self.store.set(&Self::storage_key(phone), value).await {
                    warn!(error = %e, "wishlist persist failed");
                }
            }
            Err(e) => warn!(error = %e, "wishlist serialize failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn phone(s: &str) -> Phone {
        Phone::parse(s).unwrap()
    }

    fn entry(product: &str, variant: Option<VariantKey>) -> WishlistEntry {
        WishlistEntry {
            product_id: ProductId::new(product),
            name: format!("Product {product}"),
            price: Decimal::from(100),
            sale_price: None,
            image: String::new(),
            category: None,
            variant_label: variant.map(|_| "1 kg".to_string()),
            variant,
        }
    }

    fn ledger() -> (Arc<MemoryStore>, WishlistLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = WishlistLedger::new(store.clone());
        (store, ledger)
    }

    #[tokio::test]
    async fn test_add_without_phone_is_noop() {
        let (_store, ledger) = ledger();
        ledger.add(entry("7", None)).await;
        assert!(ledger.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_dedupes_by_product_id_only() {
        let (_store, ledger) = ledger();
        ledger.set_phone(Some(phone("9876543210"))).await;

        ledger.add(entry("7", None)).await;
        ledger
            .add(entry("7", Some(VariantKey::new(Decimal::from(450), None))))
            .await;

        // differing variant details still collapse onto one entry
        assert_eq!(ledger.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_filters_by_id() {
        let (_store, ledger) = ledger();
        ledger.set_phone(Some(phone("9876543210"))).await;

        ledger.add(entry("7", None)).await;
        ledger.add(entry("8", None)).await;
        ledger.remove(&ProductId::new("7")).await;

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().product_id.as_str(), "8");
    }

    #[tokio::test]
    async fn test_phone_scopes_are_independent() {
        let (_store, ledger) = ledger();

        ledger.set_phone(Some(phone("9876543210"))).await;
        ledger.load().await;
        ledger.add(entry("7", None)).await;

        // switch account: the other phone's collection is its own
        ledger.set_phone(Some(phone("1112223334"))).await;
        ledger.load().await;
        assert!(ledger.entries().await.is_empty());

        ledger.add(entry("9", None)).await;

        // switch back: the first phone's entries are intact
        ledger.set_phone(Some(phone("9876543210"))).await;
        ledger.load().await;
        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().product_id.as_str(), "7");
    }

    #[tokio::test]
    async fn test_load_without_phone_is_noop() {
        let (_store, ledger) = ledger();
        ledger.load().await;
        assert!(ledger.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_entries_survive_reload_through_store() {
        let (store, ledger) = ledger();
        ledger.set_phone(Some(phone("9876543210"))).await;
        ledger.add(entry("7", None)).await;

        let reloaded = WishlistLedger::new(store);
        reloaded.set_phone(Some(phone("9876543210"))).await;
        reloaded.load().await;
        assert_eq!(reloaded.entries().await.len(), 1);
    }
}
