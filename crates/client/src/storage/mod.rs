//! Local persistence seam: a string-keyed, JSON-valued store.
//!
//! The storefront mirrors cart, wishlist, and saved addresses into a
//! device-local store so screens can render without the network. Ledgers
//! write whole collections per key (full-collection overwrite, no partial
//! updates), so the seam is deliberately small: get, set, remove.
//!
//! # Keys
//!
//! - `cart` - all cart lines, every owner
//! - `wishlist_<phone>` - one collection per scoped phone
//! - `addresses` - all saved addresses, with a per-entry owner field

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when reading or writing the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A string-keyed asynchronous key-value store holding JSON documents.
///
/// Implementations must be safe to share behind an `Arc` across tasks;
/// ledgers serialize their own read-modify-write cycles, so the store
/// itself only needs per-call consistency.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Overwrite the document stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete the document stored under `key`. Deleting a missing key is
    /// not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
