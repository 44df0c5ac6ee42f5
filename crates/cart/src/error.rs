//! Unified error handling for cart operations.
//!
//! Errors never leave the mutation operations: the manager logs them and maps
//! them to a [`Notice`] via [`CartError::notice`].

use rocketshoes_core::{EntryError, ProductId};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::notify::Notice;
use crate::store::StoreError;

/// Which mutation an error arose in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    /// Notice reported when this operation fails for a reason other than stock.
    #[must_use]
    pub const fn failure_notice(self) -> Notice {
        match self {
            Self::Add => Notice::AddFailed,
            Self::Remove => Notice::RemoveFailed,
            Self::Update => Notice::UpdateFailed,
        }
    }
}

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Store read or write failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cart transition was invalid.
    #[error(transparent)]
    Entry(#[from] EntryError),

    /// Requested quantity exceeds available stock.
    #[error("Product {id}: requested {requested}, {available} in stock")]
    OutOfStock {
        id: ProductId,
        requested: u32,
        available: i64,
    },
}

impl CartError {
    /// Notice to show when this error ends `operation`.
    #[must_use]
    pub const fn notice(&self, operation: Operation) -> Notice {
        match self {
            Self::OutOfStock { .. } => Notice::OutOfStock,
            _ => operation.failure_notice(),
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
