//! Client-side ledgers mirroring server-visible intent locally.
//!
//! Each ledger owns an in-memory collection plus its storage key, and
//! serializes every read-modify-write cycle behind one async mutex - two
//! rapid taps on "add" merge instead of losing an update. Persistence is
//! a full-collection overwrite after every mutation; a failed write is
//! logged and the in-memory state stays authoritative for the session.

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod wishlist;

pub use addresses::{Address, AddressBook};
pub use cart::{CartLedger, CartLine, CartTotals};
pub use checkout::{CheckoutSelection, ShippingMethod};
pub use wishlist::{WishlistEntry, WishlistLedger};
