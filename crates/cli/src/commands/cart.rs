//! Cart commands.
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Catalog API base URL
//! - `CATALOG_API_TOKEN` - Optional bearer token
//! - `CART_STORE_PATH` - JSON store file
//! - `CART_STORAGE_KEY` - Key the cart is stored under

use std::path::PathBuf;
use std::sync::Arc;

use rocketshoes_cart::{
    CartConfig, CartManager, HttpCatalogClient, JsonFileStore, MutationOutcome, Notice,
    TracingNotifier,
};
use rocketshoes_core::{Cart, ProductId};
use thiserror::Error;
use tracing::info;
use url::Url;

/// A cart command that ran but did not go through.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Rejected(pub Notice);

/// Load configuration, apply overrides, and build the cart manager.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the HTTP client cannot be
/// built, or the store cannot be read.
pub async fn open(
    api_url: Option<Url>,
    store: Option<PathBuf>,
) -> Result<CartManager, Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;
    if let Some(url) = api_url {
        config.catalog.set_base_url(url);
    }
    if let Some(path) = store {
        config.store_path = path;
    }

    let catalog = HttpCatalogClient::new(&config.catalog)?;
    let store = Arc::new(JsonFileStore::new(&config.store_path));
    info!(
        catalog = %config.catalog.base_url,
        store = %store.path().display(),
        "Opening cart"
    );

    let manager = CartManager::load(
        Arc::new(catalog),
        store,
        Arc::new(TracingNotifier),
        config.storage_key,
    )
    .await?;
    Ok(manager)
}

/// Print the cart.
pub fn show(manager: &CartManager) {
    log_cart(&manager.cart());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `Rejected` if the cart refused the change.
pub async fn add(manager: &CartManager, id: ProductId) -> Result<(), Rejected> {
    report(manager, manager.add_product(id).await)
}

/// Remove a product.
///
/// # Errors
///
/// Returns `Rejected` if the cart refused the change.
pub async fn remove(manager: &CartManager, id: ProductId) -> Result<(), Rejected> {
    report(manager, manager.remove_product(id).await)
}

/// Set a product's amount.
///
/// # Errors
///
/// Returns `Rejected` if the cart refused the change.
pub async fn update(manager: &CartManager, id: ProductId, amount: i64) -> Result<(), Rejected> {
    report(manager, manager.update_product_amount(id, amount).await)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `Rejected` if the cart could not be persisted.
pub async fn clear(manager: &CartManager) -> Result<(), Rejected> {
    report(manager, manager.clear().await)
}

fn report(manager: &CartManager, outcome: MutationOutcome) -> Result<(), Rejected> {
    match outcome {
        MutationOutcome::Applied => {
            log_cart(&manager.cart());
            Ok(())
        }
        MutationOutcome::Unchanged => {
            info!("Cart unchanged");
            Ok(())
        }
        MutationOutcome::Rejected(notice) => Err(Rejected(notice)),
    }
}

fn log_cart(cart: &Cart) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }
    for entry in cart {
        info!(
            "  #{} {} - {} x {} = {}",
            entry.id(),
            entry.product.title,
            entry.amount,
            entry.product.price,
            entry.subtotal()
        );
    }
    info!(
        "{} products, {} items, total {}",
        cart.len(),
        cart.item_count(),
        cart.total()
    );
}
