//! RocketShoes cart library.
//!
//! The cart state manager and its collaborators:
//!
//! - [`catalog`] - product and stock lookups against the catalog REST API
//! - [`store`] - string key-value persistence for the serialized cart
//! - [`notify`] - user-facing notices
//! - [`manager`] - the [`CartManager`] tying them together
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocketshoes_cart::{CartConfig, CartManager, HttpCatalogClient, JsonFileStore, TracingNotifier};
//! use rocketshoes_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let manager = CartManager::load(
//!     Arc::new(HttpCatalogClient::new(&config.catalog)?),
//!     Arc::new(JsonFileStore::new(&config.store_path)),
//!     Arc::new(TracingNotifier),
//!     config.storage_key,
//! )
//! .await?;
//!
//! manager.add_product(ProductId::new(1)).await;
//! println!("{} products", manager.cart().len());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod notify;
pub mod store;

pub use catalog::{CatalogApi, CatalogError, HttpCatalogClient};
pub use config::{CartConfig, CatalogConfig, ConfigError};
pub use error::{CartError, Operation};
pub use manager::{CartManager, MutationOutcome};
pub use notify::{ChannelNotifier, Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
