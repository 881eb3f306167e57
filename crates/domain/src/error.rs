//! Domain error types.

use thiserror::Error;

/// Errors raised by domain invariants.
///
/// Only two failure kinds are domain-significant: running out of stock and
/// an operation applied in the wrong lifecycle state. Everything else
/// (missing rows, duplicate names) is a precondition handled by the layers
/// above.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested quantity exceeds what is left in stock.
    #[error("not enough stock: requested {requested}, only {available} left")]
    InsufficientStock { requested: u32, available: u32 },

    /// The entity is not in a state that allows the operation.
    #[error("cannot {action}: {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}
