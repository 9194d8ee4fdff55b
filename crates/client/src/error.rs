//! Unified error handling for the client core.
//!
//! Subsystems carry their own error enums; `ClientError` is the umbrella
//! callers see from `AppState`-level operations. Ledger mutations never
//! surface storage failures (they degrade to logged no-ops), so the
//! variants here come from configuration, explicit storage access, the
//! catalog client, and checkout assembly.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the client core.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local persistence operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog/order API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout cannot proceed (empty cart, missing selection).
    #[error("Checkout error: {0}")]
    Checkout(String),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Checkout("no shipping method selected".to_string());
        assert_eq!(
            err.to_string(),
            "Checkout error: no shipping method selected"
        );
    }

    #[test]
    fn test_client_error_from_config() {
        let err: ClientError = ConfigError::MissingEnvVar("KIRANA_API_BASE_URL".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Config error: Missing environment variable: KIRANA_API_BASE_URL"
        );
    }
}
