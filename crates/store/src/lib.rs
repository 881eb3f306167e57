//! Persistence layer: repository traits over a relational store.
//!
//! Two interchangeable implementations share the trait surface:
//! [`PostgresStore`] runs one sqlx transaction per mutating call;
//! [`MemoryStore`] keeps the same semantics in process for tests, benches
//! and the zero-setup run mode.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use query::{OrderDetail, OrderGraph, OrderLineDetail, OrderSummary};
pub use store::{
    CategoryStore, ItemStore, MAX_SEARCH_ROWS, MemberStore, OrderQueryStore, OrderSearch,
    OrderStore, ShopStore,
};
