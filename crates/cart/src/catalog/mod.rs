//! Remote catalog and stock lookups.
//!
//! # Architecture
//!
//! - [`CatalogApi`] is the seam the cart manager depends on
//! - [`HttpCatalogClient`] talks to the REST catalog with `reqwest`
//! - The catalog is the source of truth for stock; only product metadata is
//!   cached (via `moka`), stock is fetched on every call
//!
//! # Endpoints
//!
//! - `GET products/{id}` - product attributes
//! - `GET stock/{id}` - `{ "id": …, "amount": … }`

mod http;

pub use http::HttpCatalogClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response described a different product than requested.
    #[error("Requested product {requested}, catalog answered for {received}")]
    Mismatch {
        requested: ProductId,
        received: ProductId,
    },

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read access to product metadata and stock.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch product attributes.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Fetch currently available stock.
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError>;
}
