//! Core types for Kirana.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod price;

pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{PriceRange, VariantKey};
