//! Kirana Core - Shared types library.
//!
//! This crate provides common types used across all Kirana components:
//! - `client` - Device-side storefront state core (ledgers, catalog client)
//! - `integration-tests` - End-to-end test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, phone numbers, variant
//!   fingerprints, and price ranges

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
