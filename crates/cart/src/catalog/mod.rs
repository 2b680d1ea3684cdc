//! Catalog service lookups.
//!
//! # Architecture
//!
//! - The catalog service is the source of truth for product details and stock
//! - Stock is fetched on every request and never cached
//! - Product details are cached in memory via `moka` (5 minute TTL by default)
//!
//! # Endpoints
//!
//! - `GET {base}/products/{id}` - product detail record
//! - `GET {base}/stock/{id}` - `{ "amount": n }`

mod http;

pub use http::HttpCatalog;

use std::future::Future;

use thiserror::Error;

use rocketshoes_core::{Product, ProductId, Stock};

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog does not know the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service answered for a different product than the one requested.
    #[error("Requested product {requested} but catalog returned {returned}")]
    ProductMismatch {
        requested: ProductId,
        returned: ProductId,
    },

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The client could not be constructed.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Product and stock lookups.
pub trait Catalog: Send + Sync {
    /// Fetch the detail record of a product.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Fetch the current stock level of a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;
}
