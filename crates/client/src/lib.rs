//! Kirana Client - Device-side storefront state core.
//!
//! This library holds the state a mobile storefront screen reads and
//! mutates: the cart and wishlist ledgers, the saved-address book, the
//! checkout selection, and a REST catalog/order client with lenient
//! payload normalization.
//!
//! # Architecture
//!
//! - The backend is the source of truth for the catalog; the client
//!   re-fetches per screen visit and caches reads briefly via `moka`
//! - Cart, wishlist, and addresses mirror server-visible intent locally
//!   through a string-keyed JSON [`storage::KeyValueStore`]
//! - Every ledger serializes its read-modify-write cycles behind an async
//!   mutex, so rapid successive mutations cannot lose updates
//! - Fallible fetches return typed errors; ledger persistence degrades to a
//!   logged no-op so a storage hiccup never interrupts an interaction
//!
//! # Example
//!
//! ```rust,ignore
//! use kirana_client::{AppState, config::ClientConfig};
//! use kirana_core::Phone;
//!
//! let state = AppState::new(ClientConfig::from_env()?)?;
//! let phone = Phone::parse("+919876543210")?;
//!
//! state.cart().load().await;
//! let products = state.catalog().products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod state;
pub mod storage;

pub use error::ClientError;
pub use state::AppState;
