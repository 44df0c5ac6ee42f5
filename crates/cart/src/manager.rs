//! Cart state manager.
//!
//! Holds the authoritative cart and mediates every mutation:
//!
//! 1. Take the write lock, so stock checks and commits of concurrent calls on
//!    the same manager never interleave.
//! 2. Validate against the catalog (stock is always fetched fresh).
//! 3. Build the next immutable [`Cart`] snapshot.
//! 4. Write it to the store; only if that succeeds publish it in memory.
//!
//! Faults never propagate to callers. They are logged, mapped to a
//! [`Notice`], sent to the notifier, and reported back as
//! [`MutationOutcome::Rejected`].

use std::sync::Arc;

use rocketshoes_core::{Cart, EntryError, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::catalog::CatalogApi;
use crate::error::{CartError, Operation, Result};
use crate::notify::{Notice, Notifier};
use crate::store::KeyValueStore;

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A new snapshot was persisted and published.
    Applied,
    /// Nothing needed to change; the store was not written.
    Unchanged,
    /// The mutation failed and the notice was shown to the user.
    Rejected(Notice),
}

/// Cart state manager.
///
/// Cheaply cloneable via `Arc`; clones share state and the write lock.
#[derive(Clone)]
pub struct CartManager {
    inner: Arc<CartManagerInner>,
}

struct CartManagerInner {
    catalog: Arc<dyn CatalogApi>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    storage_key: String,
    snapshot: watch::Sender<Arc<Cart>>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("storage_key", &self.inner.storage_key)
            .field("cart", &*self.cart())
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Create a manager, reading the initial cart from `store`.
    ///
    /// A missing key yields an empty cart. A stored value that is not a valid
    /// cart is logged and replaced by an empty cart on the next mutation.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store cannot be read.
    #[instrument(skip(catalog, store, notifier, storage_key))]
    pub async fn load(
        catalog: Arc<dyn CatalogApi>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        storage_key: impl Into<String>,
    ) -> Result<Self> {
        let storage_key = storage_key.into();

        let cart = match store.get(&storage_key).await? {
            Some(raw) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                warn!(key = %storage_key, error = %e, "Stored cart is malformed, starting empty");
                Cart::new()
            }),
            None => Cart::new(),
        };
        info!(key = %storage_key, products = cart.len(), "Cart loaded");

        let (snapshot, _) = watch::channel(Arc::new(cart));

        Ok(Self {
            inner: Arc::new(CartManagerInner {
                catalog,
                store,
                notifier,
                storage_key,
                snapshot,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.inner.snapshot.borrow().clone()
    }

    /// Receive every snapshot published after this call.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.inner.snapshot.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// Products already in the cart go through the amount-update path with
    /// `current + 1`. New products need at least one unit in stock and are
    /// inserted at amount 1.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_product(&self, id: ProductId) -> MutationOutcome {
        let _guard = self.inner.write_lock.lock().await;
        let result = self.try_add(id).await;
        self.finish(Operation::Add, result)
    }

    /// Remove a product's entry. Never contacts the catalog.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_product(&self, id: ProductId) -> MutationOutcome {
        let _guard = self.inner.write_lock.lock().await;
        let result = self.try_remove(id).await;
        self.finish(Operation::Remove, result)
    }

    /// Set a product's held amount.
    ///
    /// A non-positive `amount` is ignored without a notice. Otherwise the
    /// product must be in the cart and `amount` must not exceed stock.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_product_amount(&self, id: ProductId, amount: i64) -> MutationOutcome {
        if amount <= 0 {
            debug!(amount, "Ignoring non-positive amount");
            return MutationOutcome::Unchanged;
        }

        let _guard = self.inner.write_lock.lock().await;
        let result = match u32::try_from(amount) {
            Ok(target) => self.try_set_amount(id, target).await,
            Err(_) => Err(EntryError::InvalidAmount { id, amount }.into()),
        };
        self.finish(Operation::Update, result)
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> MutationOutcome {
        let _guard = self.inner.write_lock.lock().await;
        if self.cart().is_empty() {
            return MutationOutcome::Unchanged;
        }
        let result = self
            .commit(Cart::new())
            .await
            .map(|()| MutationOutcome::Applied);
        self.finish(Operation::Remove, result)
    }

    // =========================================================================
    // Mutation bodies (write lock held)
    // =========================================================================

    async fn try_add(&self, id: ProductId) -> Result<MutationOutcome> {
        if let Some(held) = self.cart().amount_of(id) {
            let target = held.checked_add(1).ok_or(EntryError::InvalidAmount {
                id,
                amount: i64::from(held) + 1,
            })?;
            return self.try_set_amount(id, target).await;
        }

        let stock = self.inner.catalog.stock(id).await?;
        if !stock.in_stock() {
            return Err(CartError::OutOfStock {
                id,
                requested: 1,
                available: stock.amount,
            });
        }

        let product = self.inner.catalog.product(id).await?;
        let next = self.cart().with_product(product)?;
        self.commit(next).await?;

        info!(stock = stock.amount, "Product added to cart");
        Ok(MutationOutcome::Applied)
    }

    async fn try_remove(&self, id: ProductId) -> Result<MutationOutcome> {
        let next = self.cart().without_product(id)?;
        self.commit(next).await?;

        info!("Product removed from cart");
        Ok(MutationOutcome::Applied)
    }

    async fn try_set_amount(&self, id: ProductId, target: u32) -> Result<MutationOutcome> {
        let held = self
            .cart()
            .amount_of(id)
            .ok_or(EntryError::NotInCart(id))?;
        if held == target {
            return Ok(MutationOutcome::Unchanged);
        }

        let stock = self.inner.catalog.stock(id).await?;
        if !stock.covers(target) {
            return Err(CartError::OutOfStock {
                id,
                requested: target,
                available: stock.amount,
            });
        }

        let next = self.cart().with_amount(id, target)?;
        self.commit(next).await?;

        info!(from = held, to = target, stock = stock.amount, "Product amount updated");
        Ok(MutationOutcome::Applied)
    }

    /// Persist `next`, then publish it. Nothing is published if the write fails.
    async fn commit(&self, next: Cart) -> Result<()> {
        let body = serde_json::to_string(&next)?;
        self.inner.store.set(&self.inner.storage_key, &body).await?;
        self.inner.snapshot.send_replace(Arc::new(next));
        Ok(())
    }

    /// Convert a mutation result into an outcome, notifying on failure.
    fn finish(&self, operation: Operation, result: Result<MutationOutcome>) -> MutationOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let notice = err.notice(operation);
                match &err {
                    CartError::OutOfStock { .. } | CartError::Entry(_) => {
                        info!(operation = ?operation, error = %err, "Cart mutation rejected");
                    }
                    _ => warn!(operation = ?operation, error = %err, "Cart mutation failed"),
                }
                self.inner.notifier.notify(notice);
                MutationOutcome::Rejected(notice)
            }
        }
    }
}
