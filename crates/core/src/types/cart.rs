//! The cart: an ordered list of products with held quantities.
//!
//! A [`Cart`] is an immutable snapshot. Every transition (`with_product`,
//! `with_amount`, `without_product`) returns a new cart and leaves the
//! original untouched, so a caller can persist the next snapshot before
//! publishing it.
//!
//! # Invariants
//!
//! - Entries are unique by product ID; quantity is tracked via `amount`, never
//!   by repeating an entry.
//! - Every entry's `amount` is at least 1. A transition that would leave an
//!   entry at zero is rejected; removal goes through `without_product`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::{Price, Product, ProductId};

/// Errors from cart transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryError {
    /// No entry exists for the product.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// An entry already exists for the product.
    #[error("Product {0} is already in the cart")]
    AlreadyInCart(ProductId),

    /// Held amounts must be positive.
    #[error("Invalid amount {amount} for product {id}")]
    InvalidAmount { id: ProductId, amount: i64 },
}

/// A product held in the cart, with its quantity.
///
/// Serialized flat, e.g. `{"id":1,"title":"…","price":179.9,"image":"…","amount":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product being held.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity held. Always at least 1.
    pub amount: u32,
}

impl CartEntry {
    /// ID of the held product.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.amount)
    }
}

/// Entry shape accepted from storage, before normalization.
#[derive(Deserialize)]
struct StoredEntry {
    #[serde(flatten)]
    product: Product,
    amount: i64,
}

/// An ordered, duplicate-free list of cart entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from raw `(product, amount)` pairs.
    ///
    /// Pairs with a non-positive amount are dropped, and for duplicate IDs the
    /// first occurrence wins. Amounts above `u32::MAX` are clamped.
    pub fn from_entries(entries: impl IntoIterator<Item = (Product, i64)>) -> Self {
        let mut cart = Self::new();
        for (product, amount) in entries {
            if amount <= 0 || cart.contains(product.id) {
                continue;
            }
            let amount = u32::try_from(amount).unwrap_or(u32::MAX);
            cart.entries.push(CartEntry { product, amount });
        }
        cart
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.iter()
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Whether the product has an entry.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Amount held for a product, if present.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> Option<u32> {
        self.get(id).map(|entry| entry.amount)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all held amounts.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.amount)).sum()
    }

    /// Sum of all entry subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.iter().map(CartEntry::subtotal).sum()
    }

    /// A new cart with `product` appended at amount 1.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::AlreadyInCart` if the product already has an entry.
    pub fn with_product(&self, product: Product) -> Result<Self, EntryError> {
        if self.contains(product.id) {
            return Err(EntryError::AlreadyInCart(product.id));
        }
        let mut entries = self.entries.clone();
        entries.push(CartEntry { product, amount: 1 });
        Ok(Self { entries })
    }

    /// A new cart with the product's amount set to `amount`.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::InvalidAmount` for zero, or
    /// `EntryError::NotInCart` if the product has no entry.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Result<Self, EntryError> {
        if amount == 0 {
            return Err(EntryError::InvalidAmount { id, amount: 0 });
        }
        if !self.contains(id) {
            return Err(EntryError::NotInCart(id));
        }
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                if entry.id() == id {
                    CartEntry {
                        product: entry.product.clone(),
                        amount,
                    }
                } else {
                    entry.clone()
                }
            })
            .collect();
        Ok(Self { entries })
    }

    /// A new cart without the product's entry.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::NotInCart` if the product has no entry.
    pub fn without_product(&self, id: ProductId) -> Result<Self, EntryError> {
        if !self.contains(id) {
            return Err(EntryError::NotInCart(id));
        }
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.id() != id)
            .cloned()
            .collect();
        Ok(Self { entries })
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = Vec::<StoredEntry>::deserialize(deserializer)?;
        Ok(Self::from_entries(
            stored.into_iter().map(|e| (e.product, e.amount)),
        ))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
