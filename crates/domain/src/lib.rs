//! Domain layer for the order-management backend.
//!
//! Plain entities with identity and a few invariant-preserving methods:
//! - Member with an embedded address
//! - Item catalog with checked stock arithmetic
//! - Order lifecycle (ORDERED → CANCELLED) with factory-only construction
//! - Delivery and the category tree
//!
//! No I/O lives here; persistence and use-case composition sit in the
//! `store` and `service` crates.

pub mod category;
pub mod delivery;
pub mod error;
pub mod ids;
pub mod item;
pub mod member;
pub mod order;

pub use category::Category;
pub use delivery::{Delivery, DeliveryStatus};
pub use error::DomainError;
pub use ids::{CategoryId, DeliveryId, ItemId, MemberId, OrderId, OrderLineId};
pub use item::{Item, ItemDetails};
pub use member::{Address, Member};
pub use order::{Order, OrderLine, OrderStatus};
