//! Read-side types: hydrated order graphs and flat projections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use domain::{Address, Member, Order, OrderId, OrderStatus};

/// A fully loaded order together with its owning member.
///
/// What the entity-shaped endpoints return; the fetch strategies on
/// [`OrderStore`](crate::OrderStore) all produce this.
#[derive(Debug, Clone, Serialize)]
pub struct OrderGraph {
    pub order: Order,
    pub member: Member,
}

/// Flat one-row-per-order projection, trimmed to the summary columns.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub member_name: String,
    pub ordered_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
}

/// One flattened order line: the item name joined in, price and quantity.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineDetail {
    pub item_name: String,
    pub order_price: i64,
    pub quantity: u32,
}

/// Summary plus flattened lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order_id: OrderId,
    pub member_name: String,
    pub ordered_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub address: Address,
    pub lines: Vec<OrderLineDetail>,
}
