//! Service error types.

use domain::{DomainError, ItemId, MemberId, OrderId};
use store::StoreError;
use thiserror::Error;

/// Errors raised by the use-case layer.
///
/// Domain and store failures pass through; the not-found and
/// duplicate-name variants are the precondition checks the use cases add
/// on top.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A domain invariant rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No member with this ID.
    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    /// No item with this ID.
    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    /// No order with this ID.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// A member with this name already exists.
    #[error("a member named {0:?} already exists")]
    DuplicateMemberName(String),
}
