//! Cache types for catalog API responses.

use super::types::{Banner, Brand, Category, Product};

/// Cached value types. Orders and rewards are never cached: orders are
/// user-mutable state, and reward availability changes with redemptions.
#[derive(Debug, Clone)]
pub(crate) enum CacheValue {
    Products(Vec<Product>),
    Banners(Vec<Banner>),
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}
