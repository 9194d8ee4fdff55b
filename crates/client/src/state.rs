//! Application state shared across screens.

use std::sync::Arc;

use tracing::{info, instrument};

use kirana_core::Phone;

use crate::catalog::{CatalogClient, NewOrder, Order};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ledger::{AddressBook, CartLedger, CheckoutSelection, WishlistLedger};
use crate::storage::{FsStore, KeyValueStore};

/// Application state shared across all screens.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// shared ledgers, the catalog client, and configuration. It is built
/// once at startup and injected into screens, so tests construct their
/// own instance over a throwaway store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    storage: Arc<dyn KeyValueStore>,
    catalog: CatalogClient,
    cart: CartLedger,
    wishlist: WishlistLedger,
    addresses: AddressBook,
    checkout: CheckoutSelection,
}

impl AppState {
    /// Create application state over the configured on-device store.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FsStore::new(&config.data_dir));
        Self::with_store(config, storage)
    }

    /// Create application state over an explicit store (tests, guest
    /// sessions).
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be constructed.
    pub fn with_store(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ClientError> {
        let catalog = CatalogClient::new(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage: storage.clone(),
                catalog,
                cart: CartLedger::new(storage.clone()),
                wishlist: WishlistLedger::new(storage.clone()),
                addresses: AddressBook::new(storage.clone()),
                checkout: CheckoutSelection::new(),
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the on-device store.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.storage
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the cart ledger.
    #[must_use]
    pub fn cart(&self) -> &CartLedger {
        &self.inner.cart
    }

    /// Get a reference to the wishlist ledger.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistLedger {
        &self.inner.wishlist
    }

    /// Get a reference to the address book.
    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.inner.addresses
    }

    /// Get a reference to the checkout selection.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutSelection {
        &self.inner.checkout
    }

    /// Load all persisted collections after process start.
    pub async fn load_all(&self) {
        self.inner.cart.load().await;
        self.inner.wishlist.load().await;
        self.inner.addresses.load().await;
    }

    /// Place an order from the user's cart and checkout selections.
    ///
    /// On success the user's cart lines are cleared and the checkout
    /// selection is reset.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Checkout`] when the cart is empty or a
    /// selection is missing, and [`ClientError::Catalog`] when the
    /// backend rejects the order.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn place_order(
        &self,
        user: &Phone,
        points_redeemed: i64,
    ) -> Result<Order, ClientError> {
        let lines = self.inner.cart.lines_for(user).await;
        if lines.is_empty() {
            return Err(ClientError::Checkout("cart is empty".to_string()));
        }

        let address = self
            .inner
            .checkout
            .selected_address()
            .ok_or_else(|| ClientError::Checkout("no address selected".to_string()))?;
        let shipping = self
            .inner
            .checkout
            .selected_shipping()
            .ok_or_else(|| ClientError::Checkout("no shipping method selected".to_string()))?;

        let new_order =
            NewOrder::from_checkout(user.clone(), &lines, address, shipping, points_redeemed);
        let order = self.inner.catalog.create_order(&new_order).await?;

        info!(order_id = %order.id, "order placed");
        self.inner.cart.clear_for(user).await;
        self.inner.checkout.clear();

        Ok(order)
    }
}
