//! Store error types.

use domain::{ItemId, OrderId};
use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back into a domain type.
    #[error("invalid stored value: {0}")]
    Decode(String),

    /// The conditional stock decrement found fewer units than requested.
    #[error("not enough stock for item {item_id}")]
    InsufficientStock { item_id: ItemId },

    /// The guarded status update found the order no longer cancellable.
    #[error("order {order_id} is not in a cancellable state")]
    OrderNotCancellable { order_id: OrderId },
}

pub type Result<T> = std::result::Result<T, StoreError>;
