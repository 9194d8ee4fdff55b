//! Checkout selection: single-slot holders for the current address and
//! shipping method.
//!
//! Selections live for the process only - the saved-address list
//! persists, the *selection* does not. A std mutex is enough here: the
//! slots are plain data and the lock is never held across an await.

use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::addresses::Address;

/// A shipping option offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: String,
    pub label: String,
    pub fee: Decimal,
    /// Estimated delivery window in days.
    pub eta_days: Option<u32>,
}

#[derive(Debug, Default)]
struct Slots {
    address: Option<Address>,
    shipping: Option<ShippingMethod>,
}

/// Holder for the checkout flow's current selections.
#[derive(Debug, Default)]
pub struct CheckoutSelection {
    slots: Mutex<Slots>,
}

impl CheckoutSelection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the shipping address.
    pub fn select_address(&self, address: Address) {
        self.lock().address = Some(address);
    }

    /// Select the shipping method.
    pub fn select_shipping(&self, shipping: ShippingMethod) {
        self.lock().shipping = Some(shipping);
    }

    /// The currently selected address.
    #[must_use]
    pub fn selected_address(&self) -> Option<Address> {
        self.lock().address.clone()
    }

    /// The currently selected shipping method.
    #[must_use]
    pub fn selected_shipping(&self) -> Option<ShippingMethod> {
        self.lock().shipping.clone()
    }

    /// Clear both slots (after order placement or logout).
    pub fn clear(&self) {
        let mut slots = self.lock();
        slots.address = None;
        slots.shipping = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kirana_core::Phone;

    fn shipping() -> ShippingMethod {
        ShippingMethod {
            id: "express".to_string(),
            label: "Express".to_string(),
            fee: Decimal::from(80),
            eta_days: Some(1),
        }
    }

    #[test]
    fn test_slots_start_empty() {
        let selection = CheckoutSelection::new();
        assert!(selection.selected_address().is_none());
        assert!(selection.selected_shipping().is_none());
    }

    #[test]
    fn test_select_overwrites() {
        let selection = CheckoutSelection::new();
        let phone = Phone::parse("9876543210").unwrap();

        let first = Address::new(phone.clone(), "Asha", "14 MG Road", None, "Bengaluru", "KA", "560001");
        let second = Address::new(phone, "Asha", "2 Brigade Road", None, "Bengaluru", "KA", "560025");
        let second_id = second.id.clone();

        selection.select_address(first);
        selection.select_address(second);
        assert_eq!(selection.selected_address().unwrap().id, second_id);

        selection.select_shipping(shipping());
        assert_eq!(selection.selected_shipping().unwrap().id, "express");
    }

    #[test]
    fn test_clear_empties_both_slots() {
        let selection = CheckoutSelection::new();
        selection.select_shipping(shipping());
        selection.clear();
        assert!(selection.selected_shipping().is_none());
        assert!(selection.selected_address().is_none());
    }
}
