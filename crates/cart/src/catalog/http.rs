//! REST catalog client implementation.
//!
//! One request per call, no retries. Products are cached in a `moka` future
//! cache when a TTL is configured; stock never is.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogApi, CatalogError};
use crate::config::CatalogConfig;

/// Client for the catalog REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the product
/// cache.
#[derive(Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

struct HttpCatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    products: Option<Cache<ProductId, Product>>,
}

impl std::fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_token", &self.inner.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("cached", &self.inner.products.is_some())
            .finish()
    }
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let products = config.cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(HttpCatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                products,
            }),
        })
    }

    /// GET a JSON resource relative to the base URL.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = self.inner.base_url.join(path)?;

        let mut request = self.inner.client.get(url);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;
        if product.id != id {
            return Err(CatalogError::Mismatch {
                requested: id,
                received: product.id,
            });
        }

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let stock: Stock = self.get_json(&format!("stock/{id}")).await?;
        if stock.id != id {
            return Err(CatalogError::Mismatch {
                requested: id,
                received: stock.id,
            });
        }
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rocketshoes_core::Price;

    use super::*;

    fn config_for(server: &mockito::ServerGuard) -> CatalogConfig {
        let mut config = CatalogConfig::new(Url::parse(&format!("{}/", server.url())).unwrap());
        config.timeout = Some(Duration::from_secs(2));
        config
    }

    const PRODUCT_BODY: &str = r#"{"id":1,"title":"Tênis de Caminhada","price":179.9,"image":"https://example.com/1.jpg"}"#;

    #[tokio::test]
    async fn test_fetches_product() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/products/1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PRODUCT_BODY)
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        let product = client.product(ProductId::new(1)).await.unwrap();

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17990));
    }

    #[tokio::test]
    async fn test_product_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/1")
            .with_status(200)
            .with_body(PRODUCT_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        client.product(ProductId::new(1)).await.unwrap();
        client.product(ProductId::new(1)).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_product_cache_can_be_disabled() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/1")
            .with_status(200)
            .with_body(PRODUCT_BODY)
            .expect(2)
            .create_async()
            .await;

        let mut config = config_for(&server);
        config.cache_ttl = None;
        let client = HttpCatalogClient::new(&config).unwrap();
        client.product(ProductId::new(1)).await.unwrap();
        client.product(ProductId::new(1)).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stock_is_never_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stock/1")
            .with_status(200)
            .with_body(r#"{"id":1,"amount":3}"#)
            .expect(2)
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        let first = client.stock(ProductId::new(1)).await.unwrap();
        let second = client.stock(ProductId::new(1)).await.unwrap();

        assert_eq!(first.amount, 3);
        assert_eq!(second, first);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stock/99")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        let err = client.stock(ProductId::new(99)).await.unwrap_err();

        assert!(matches!(err, CatalogError::NotFound(ref path) if path == "stock/99"));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stock/1")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        let err = client.stock(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CatalogError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stock/1")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        let err = client.stock(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn test_mismatched_id() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stock/1")
            .with_status(200)
            .with_body(r#"{"id":2,"amount":5}"#)
            .create_async()
            .await;

        let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
        let err = client.stock(ProductId::new(1)).await.unwrap_err();

        assert!(matches!(err, CatalogError::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stock/1")
            .match_header("authorization", "Bearer tok_8f3kQz19xLp")
            .with_status(200)
            .with_body(r#"{"id":1,"amount":1}"#)
            .create_async()
            .await;

        let mut config = config_for(&server);
        config.api_token = Some(SecretString::from("tok_8f3kQz19xLp"));
        let client = HttpCatalogClient::new(&config).unwrap();
        client.stock(ProductId::new(1)).await.unwrap();

        mock.assert_async().await;
    }
}
