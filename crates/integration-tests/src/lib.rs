//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Mutations against a mock catalog and a file-backed store
//! - `cart_persistence` - Reloading, on-disk format, and concurrent writers
//!
//! Each test gets its own [`TestContext`]: a `mockito` catalog server and a
//! temporary directory for the store file. No external services are needed.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rocketshoes_cart::{
    CartManager, CatalogConfig, HttpCatalogClient, JsonFileStore, KeyValueStore,
    RecordingNotifier,
};
use rocketshoes_core::Cart;
use url::Url;

/// Storage key used by every test.
pub const STORAGE_KEY: &str = "@RocketShoes:cart";

/// Mock catalog plus scratch storage for one test.
pub struct TestContext {
    pub server: mockito::ServerGuard,
    pub dir: tempfile::TempDir,
    pub notices: Arc<RecordingNotifier>,
    mocks: HashMap<String, mockito::Mock>,
}

impl TestContext {
    /// Start a mock catalog and create a scratch directory.
    pub async fn new() -> Self {
        Self {
            server: mockito::Server::new_async().await,
            dir: tempfile::tempdir().unwrap(),
            notices: Arc::new(RecordingNotifier::new()),
            mocks: HashMap::new(),
        }
    }

    /// Path of the JSON store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    /// Serve a product at `products/{id}`.
    pub async fn product(&mut self, id: i32, title: &str, price: &str) {
        let body = format!(
            r#"{{"id":{id},"title":"{title}","price":{price},"image":"https://example.com/{id}.jpg"}}"#
        );
        self.serve(format!("/products/{id}"), 200, body).await;
    }

    /// Serve a stock record at `stock/{id}`.
    pub async fn stock(&mut self, id: i32, amount: i64) {
        let body = format!(r#"{{"id":{id},"amount":{amount}}}"#);
        self.serve(format!("/stock/{id}"), 200, body).await;
    }

    /// Serve a product with the given stock.
    pub async fn listed(&mut self, id: i32, title: &str, price: &str, stock: i64) {
        self.product(id, title, price).await;
        self.stock(id, stock).await;
    }

    /// Serve an arbitrary response at `path`, replacing any earlier mock.
    pub async fn serve(&mut self, path: String, status: usize, body: String) {
        drop(self.mocks.remove(&path));
        let mock = self
            .server
            .mock("GET", path.as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.mocks.insert(path, mock);
    }

    /// Build a manager over the mock catalog and the store file.
    ///
    /// Each call starts from whatever is on disk, like a process restart.
    pub async fn manager(&self) -> CartManager {
        let url = Url::parse(&self.server.url()).unwrap();
        let mut config = CatalogConfig::new(url);
        config.timeout = Some(std::time::Duration::from_secs(5));

        CartManager::load(
            Arc::new(HttpCatalogClient::new(&config).unwrap()),
            Arc::new(JsonFileStore::new(self.store_path())),
            self.notices.clone(),
            STORAGE_KEY,
        )
        .await
        .unwrap()
    }

    /// Cart currently persisted on disk, if any.
    pub async fn persisted(&self) -> Option<Cart> {
        JsonFileStore::new(self.store_path())
            .get(STORAGE_KEY)
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}
