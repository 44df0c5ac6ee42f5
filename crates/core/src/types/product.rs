//! Catalog records as served by the products and stock endpoints.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A catalog product.
///
/// Display attributes are opaque to cart logic; only `id` participates in
/// cart bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    #[serde(default)]
    pub image: String,
}

/// Units of a product available upstream.
///
/// The catalog is the source of truth and the figure can change between
/// reads, so stock records are never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product ID this stock record belongs to.
    pub id: ProductId,
    /// Units available. The catalog may report zero or negative values.
    pub amount: i64,
}

impl Stock {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.amount > 0
    }

    /// Whether `requested` units can be held against this stock.
    #[must_use]
    pub fn covers(&self, requested: u32) -> bool {
        i64::from(requested) <= self.amount
    }
}
