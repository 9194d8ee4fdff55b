//! Catalog and order client for the storefront backend.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest`; list responses arrive as a bare array
//!   or a `{results|data: [...]}` envelope
//! - Every raw item passes through a lenient per-kind normalizer in
//!   [`normalize`] - missing fields default, malformed variants drop
//! - Catalog reads are cached in-memory via `moka` with a configured TTL;
//!   order and redemption calls always hit the network
//! - Failures are typed: callers can distinguish "empty catalog" from
//!   "fetch failed"
//!
//! # Example
//!
//! ```rust,ignore
//! use kirana_client::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config)?;
//!
//! let products = client.products().await?;
//! let order = client.create_order(&new_order).await?;
//! ```

mod cache;
mod normalize;
pub mod types;

pub use types::{
    Banner, Brand, Category, NewOrder, NewOrderLine, Order, OrderItem, Product, Reward, Variant,
};

use std::sync::Arc;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use kirana_core::{OrderId, Phone, RewardId};

use crate::config::ClientConfig;
use cache::CacheValue;
use normalize::{
    extract_items, map_banner, map_brand, map_category, map_order, map_product, map_reward,
};

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("unexpected status {status} from {endpoint}")]
    Status {
        /// Endpoint path that failed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// Response body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but is neither an array nor a known envelope.
    #[error("unexpected payload shape from {0}")]
    Envelope(String),

    /// Endpoint path did not join onto the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the storefront backend's catalog and order endpoints.
///
/// Cheaply cloneable via `Arc`. Catalog reads are cached for the
/// configured TTL.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                http,
                base_url: config.api_base_url.clone(),
                api_key: config.api_key.clone(),
                cache,
            }),
        })
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Issue a GET and return the response body on success.
    async fn send_get(&self, path: &str) -> Result<String, CatalogError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.authorized(self.inner.http.get(url)).send().await?;
        Self::read_body(path, response).await
    }

    /// Issue a POST with a JSON body and return the response body.
    async fn send_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, CatalogError> {
        let url = self.inner.base_url.join(path)?;
        let response = self
            .authorized(self.inner.http.post(url))
            .json(body)
            .send()
            .await?;
        Self::read_body(path, response).await
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.api_key {
            Some(key) => request.header("X-Api-Key", key.expose_secret()),
            None => request,
        }
    }

    async fn read_body(path: &str, response: reqwest::Response) -> Result<String, CatalogError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                endpoint = path,
                status = %status,
                body = %text.chars().take(200).collect::<String>(),
                "backend returned non-success status"
            );
            return Err(CatalogError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(text)
    }

    /// GET a list endpoint and unwrap its envelope.
    async fn get_list(&self, path: &str) -> Result<Vec<Value>, CatalogError> {
        let text = self.send_get(path).await?;
        let value: Value = serde_json::from_str(&text).inspect_err(|e| {
            warn!(
                endpoint = path,
                error = %e,
                body = %text.chars().take(200).collect::<String>(),
                "backend response is not JSON"
            );
        })?;
        extract_items(path, value)
    }

    // =========================================================================
    // Catalog Reads (cached)
    // =========================================================================

    /// Fetch the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload shape is
    /// unrecognized. An `Ok(vec![])` is a genuinely empty catalog.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get("products").await {
            debug!("cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .get_list("products")
            .await?
            .iter()
            .map(map_product)
            .collect();

        self.inner
            .cache
            .insert("products".to_string(), CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch home-screen banners.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload shape is
    /// unrecognized.
    #[instrument(skip(self))]
    pub async fn banners(&self) -> Result<Vec<Banner>, CatalogError> {
        if let Some(CacheValue::Banners(banners)) = self.inner.cache.get("banners").await {
            debug!("cache hit for banners");
            return Ok(banners);
        }

        let banners: Vec<Banner> = self
            .get_list("banners")
            .await?
            .iter()
            .map(map_banner)
            .collect();

        self.inner
            .cache
            .insert("banners".to_string(), CacheValue::Banners(banners.clone()))
            .await;

        Ok(banners)
    }

    /// Fetch product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload shape is
    /// unrecognized.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get("categories").await
        {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .get_list("categories")
            .await?
            .iter()
            .map(map_category)
            .collect();

        self.inner
            .cache
            .insert(
                "categories".to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Fetch brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload shape is
    /// unrecognized.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get("brands").await {
            debug!("cache hit for brands");
            return Ok(brands);
        }

        let brands: Vec<Brand> = self.get_list("brands").await?.iter().map(map_brand).collect();

        self.inner
            .cache
            .insert("brands".to_string(), CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    /// Fetch redeemable rewards. Not cached - availability changes with
    /// redemptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload shape is
    /// unrecognized.
    #[instrument(skip(self))]
    pub async fn rewards(&self) -> Result<Vec<Reward>, CatalogError> {
        Ok(self.get_list("rewards").await?.iter().map(map_reward).collect())
    }

    // =========================================================================
    // Orders (not cached - mutable state)
    // =========================================================================

    /// Fetch a user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload shape is
    /// unrecognized.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn orders_for(&self, user: &Phone) -> Result<Vec<Order>, CatalogError> {
        let path = format!("orders?user={}", urlencoding::encode(user.as_str()));
        Ok(self.get_list(&path).await?.iter().map(map_order).collect())
    }

    /// Place an order assembled from the cart and checkout selections.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend response
    /// cannot be parsed.
    #[instrument(skip(self, order), fields(user = %order.user))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, CatalogError> {
        let text = self.send_post("orders", order).await?;
        let value: Value = serde_json::from_str(&text)?;

        // Some deployments wrap the created record in a data envelope
        let record = match &value {
            Value::Object(map) if map.contains_key("data") => {
                map.get("data").unwrap_or(&Value::Null)
            }
            other => other,
        };

        Ok(map_order(record))
    }

    /// Advance an order's status (e.g., cancel from the order screen).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: &str,
    ) -> Result<(), CatalogError> {
        let path = format!("orders/{order_id}/status");
        self.send_post(&path, &serde_json::json!({ "status": status }))
            .await?;
        Ok(())
    }

    /// Redeem a loyalty reward for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user = %user, reward = %reward))]
    pub async fn redeem_reward(&self, user: &Phone, reward: &RewardId) -> Result<(), CatalogError> {
        self.send_post(
            "redemptions",
            &serde_json::json!({ "user": user.as_str(), "reward": reward.as_str() }),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
