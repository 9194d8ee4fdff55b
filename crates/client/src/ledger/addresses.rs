//! Saved-address book with a per-phone default flag.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use kirana_core::{AddressId, Phone};

use crate::storage::KeyValueStore;

/// Storage key for the address collection. Global: entries carry their
/// owner and readers filter by phone.
const ADDRESSES_KEY: &str = "addresses";

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    /// Owning user.
    pub phone: Phone,
    /// Recipient name.
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    /// At most one address per phone carries this flag.
    pub is_default: bool,
}

impl Address {
    /// Create a new address with a generated id and the default flag
    /// unset.
    #[must_use]
    pub fn new(
        phone: Phone,
        recipient: impl Into<String>,
        line1: impl Into<String>,
        line2: Option<String>,
        city: impl Into<String>,
        region: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            id: AddressId::new(uuid::Uuid::new_v4().to_string()),
            phone,
            recipient: recipient.into(),
            line1: line1.into(),
            line2,
            city: city.into(),
            region: region.into(),
            postal_code: postal_code.into(),
            is_default: false,
        }
    }
}

/// The saved-address book.
pub struct AddressBook {
    store: Arc<dyn KeyValueStore>,
    addresses: Mutex<Vec<Address>>,
}

impl AddressBook {
    /// Create a book over the given store. State starts empty; call
    /// [`load`](Self::load) before first display.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            addresses: Mutex::new(Vec::new()),
        }
    }

    /// Replace in-memory state from the store. Same degradation rules as
    /// the cart: nothing stored is a no-op, failures start empty.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let mut addresses = self.addresses.lock().await;
        match self.store.get(ADDRESSES_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<Address>>(value) {
                Ok(stored) => *addresses = stored,
                Err(e) => {
                    warn!(error = %e, "stored addresses are not decodable, starting empty");
                    addresses.clear();
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "address load failed, starting empty");
                addresses.clear();
            }
        }
    }

    /// Save an address.
    ///
    /// The first address saved for a phone becomes its default; an
    /// address arriving with the default flag set displaces the phone's
    /// previous default in the same write.
    #[instrument(skip(self, address), fields(address_id = %address.id))]
    pub async fn add(&self, mut address: Address) {
        let mut addresses = self.addresses.lock().await;

        let first_for_phone = !addresses.iter().any(|a| a.phone == address.phone);
        if first_for_phone {
            address.is_default = true;
        } else if address.is_default {
            for existing in addresses.iter_mut().filter(|a| a.phone == address.phone) {
                existing.is_default = false;
            }
        }

        addresses.push(address);
        self.persist(&addresses).await;
    }

    /// Make an address its phone's default, clearing the flag on every
    /// other address the phone owns. Unknown id is a logged no-op.
    #[instrument(skip(self))]
    pub async fn set_default(&self, id: &AddressId) {
        let mut addresses = self.addresses.lock().await;

        let Some(phone) = addresses
            .iter()
            .find(|a| a.id == *id)
            .map(|a| a.phone.clone())
        else {
            warn!(%id, "set_default matched no address");
            return;
        };

        for address in addresses.iter_mut().filter(|a| a.phone == phone) {
            address.is_default = address.id == *id;
        }

        self.persist(&addresses).await;
    }

    /// Delete an address. If it was the default and the phone still owns
    /// addresses, the first remaining one is promoted so the phone keeps
    /// exactly one default.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &AddressId) {
        let mut addresses = self.addresses.lock().await;

        let Some(removed) = addresses.iter().find(|a| a.id == *id).cloned() else {
            return;
        };
        addresses.retain(|a| a.id != *id);

        if removed.is_default
            && let Some(next) = addresses.iter_mut().find(|a| a.phone == removed.phone)
        {
            next.is_default = true;
        }

        self.persist(&addresses).await;
    }

    /// The given phone's addresses, in insertion order.
    pub async fn list_for(&self, phone: &Phone) -> Vec<Address> {
        self.addresses
            .lock()
            .await
            .iter()
            .filter(|a| a.phone == *phone)
            .cloned()
            .collect()
    }

    /// The given phone's default address, if any are saved.
    pub async fn default_for(&self, phone: &Phone) -> Option<Address> {
        self.addresses
            .lock()
            .await
            .iter()
            .find(|a| a.phone == *phone && a.is_default)
            .cloned()
    }

    async fn persist(&self, addresses: &[Address]) {
        match serde_json::to_value(addresses) {
            Ok(value) => {
                if let Err(e) = self.store.set(ADDRESSES_KEY, value).await {
                    warn!(error = %e, "address persist failed");
                }
            }
            Err(e) => warn!(error = %e, "address serialize failed"),
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

    fn address(owner: &str) -> Address {
        Address::new(
            phone(owner),
            "Asha",
            "14 MG Road",
            None,
            "Bengaluru",
            "KA",
            "560001",
        )
    }

    fn book() -> (Arc<MemoryStore>, AddressBook) {
        let store = Arc::new(MemoryStore::new());
        let book = AddressBook::new(store.clone());
        (store, book)
    }

    async fn default_count(book: &AddressBook, owner: &Phone) -> usize {
        book.list_for(owner)
            .await
            .iter()
            .filter(|a| a.is_default)
            .count()
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let (_store, book) = book();
        book.add(address("9876543210")).await;

        let owner = phone("9876543210");
        assert!(book.default_for(&owner).await.is_some());
        assert_eq!(default_count(&book, &owner).await, 1);
    }

    #[tokio::test]
    async fn test_set_default_displaces_previous() {
        let (_store, book) = book();
        let owner = phone("9876543210");

        book.add(address("9876543210")).await;
        let second = address("9876543210");
        let second_id = second.id.clone();
        book.add(second).await;

        book.set_default(&second_id).await;

        assert_eq!(default_count(&book, &owner).await, 1);
        assert_eq!(book.default_for(&owner).await.unwrap().id, second_id);
    }

    #[tokio::test]
    async fn test_incoming_default_flag_displaces_previous() {
        let (_store, book) = book();
        let owner = phone("9876543210");

        book.add(address("9876543210")).await;
        let mut second = address("9876543210");
        second.is_default = true;
        let second_id = second.id.clone();
        book.add(second).await;

        assert_eq!(default_count(&book, &owner).await, 1);
        assert_eq!(book.default_for(&owner).await.unwrap().id, second_id);
    }

    #[tokio::test]
    async fn test_defaults_are_per_phone() {
        let (_store, book) = book();

        book.add(address("9876543210")).await;
        book.add(address("1112223334")).await;

        assert!(book.default_for(&phone("9876543210")).await.is_some());
        assert!(book.default_for(&phone("1112223334")).await.is_some());
    }

    #[tokio::test]
    async fn test_remove_default_promotes_remaining() {
        let (_store, book) = book();
        let owner = phone("9876543210");

        let first = address("9876543210");
        let first_id = first.id.clone();
        book.add(first).await;
        book.add(address("9876543210")).await;

        book.remove(&first_id).await;

        assert_eq!(book.list_for(&owner).await.len(), 1);
        assert_eq!(default_count(&book, &owner).await, 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let (_store, book) = book();
        book.add(address("9876543210")).await;
        book.remove(&AddressId::new("missing")).await;
        assert_eq!(book.list_for(&phone("9876543210")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_addresses_survive_reload_through_store() {
        let (store, book) = book();
        book.add(address("9876543210")).await;

        let reloaded = AddressBook::new(store);
        reloaded.load().await;
        assert_eq!(reloaded.list_for(&phone("9876543210")).await.len(), 1);
    }
}
