//! Repository traits and the order search filter.
//!
//! One trait per repository; [`ShopStore`] bundles them for code that needs
//! the whole store behind a single bound. Every mutating method is one unit
//! of work: it either commits all of its writes or none of them.

use async_trait::async_trait;

use domain::{
    Category, CategoryId, DeliveryStatus, Item, ItemId, Member, MemberId, Order, OrderId,
    OrderStatus,
};

use crate::error::Result;
use crate::query::{OrderDetail, OrderGraph, OrderSummary};

/// Row cap applied to unpaged order searches.
pub const MAX_SEARCH_ROWS: i64 = 1000;

/// Filter for order searches: status equality and case-sensitive
/// member-name containment.
#[derive(Debug, Clone, Default)]
pub struct OrderSearch {
    pub status: Option<OrderStatus>,
    pub member_name: Option<String>,
}

impl OrderSearch {
    /// Restricts the search to orders in `status`.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the search to members whose name contains `name`.
    pub fn member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }

    /// Returns true if an order with the given status and member name
    /// passes the filter.
    pub fn matches(&self, status: OrderStatus, member_name: &str) -> bool {
        if let Some(wanted) = self.status
            && wanted != status
        {
            return false;
        }
        if let Some(ref fragment) = self.member_name
            && !member_name.contains(fragment.as_str())
        {
            return false;
        }
        true
    }
}

/// Member rows.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Persists a new member.
    async fn insert_member(&self, member: &Member) -> Result<()>;

    /// Loads a member by ID.
    async fn member(&self, id: MemberId) -> Result<Option<Member>>;

    /// Lists all members, ordered by name.
    async fn members(&self) -> Result<Vec<Member>>;

    /// Finds members with exactly this name (duplicate check).
    async fn members_named(&self, name: &str) -> Result<Vec<Member>>;

    /// Changes a member's name.
    async fn rename_member(&self, id: MemberId, name: &str) -> Result<()>;
}

/// Catalog item rows.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persists a new item.
    async fn insert_item(&self, item: &Item) -> Result<()>;

    /// Loads an item by ID.
    async fn item(&self, id: ItemId) -> Result<Option<Item>>;

    /// Lists all items, ordered by name.
    async fn items(&self) -> Result<Vec<Item>>;

    /// Writes back a loaded, modified item (name, price, stock).
    async fn update_item(&self, item: &Item) -> Result<()>;
}

/// Category tree and its item links.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Persists a new category node.
    async fn insert_category(&self, category: &Category) -> Result<()>;

    /// Lists all category nodes, ordered by name.
    async fn categories(&self) -> Result<Vec<Category>>;

    /// Links an item into a category.
    async fn add_item_to_category(&self, category_id: CategoryId, item_id: ItemId) -> Result<()>;

    /// Lists the items linked into a category, ordered by name.
    async fn items_in_category(&self, category_id: CategoryId) -> Result<Vec<Item>>;
}

/// Order graphs.
///
/// The three search methods answer the same logical query; they differ
/// only in how many round trips the store makes to assemble the graphs.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order graph (order, lines, delivery) and decrements
    /// stock for every line, all in one unit of work. The decrement is an
    /// atomically-checked conditional update; if any line finds fewer
    /// units than ordered, nothing is written and
    /// [`StoreError::InsufficientStock`](crate::StoreError) is returned.
    async fn create_order(&self, order: &Order) -> Result<()>;

    /// Loads one order with its lines and delivery.
    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Marks the order CANCELLED and puts every line's quantity back into
    /// stock, in one unit of work. The status flip is guarded: an order
    /// that is no longer ORDERED fails with
    /// [`StoreError::OrderNotCancellable`](crate::StoreError) and restores
    /// nothing.
    async fn cancel_order(&self, order: &Order) -> Result<()>;

    /// Updates the delivery status of an order.
    async fn update_delivery(&self, order_id: OrderId, status: DeliveryStatus) -> Result<()>;

    /// Base strategy: one read for orders, members and deliveries, then
    /// one line read per order. Capped at [`MAX_SEARCH_ROWS`].
    async fn orders(&self, search: &OrderSearch) -> Result<Vec<OrderGraph>>;

    /// Single-read strategy: the whole graph in one joined query, rows
    /// collapsed by order ID. Uncapped; pagination does not compose with
    /// the collection join.
    async fn orders_with_lines(&self, search: &OrderSearch) -> Result<Vec<OrderGraph>>;

    /// Paged strategy: a paged base read plus one batched line read keyed
    /// by the page's order IDs.
    async fn orders_paged(
        &self,
        search: &OrderSearch,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<OrderGraph>>;
}

/// Flat read-model projections, trimmed to the columns the API ships.
#[async_trait]
pub trait OrderQueryStore: Send + Sync {
    /// One order summary row per order, without lines.
    async fn order_summaries(&self, search: &OrderSearch) -> Result<Vec<OrderSummary>>;

    /// Summaries plus their flattened lines (one line read per order).
    async fn order_details(&self, search: &OrderSearch) -> Result<Vec<OrderDetail>>;
}

/// The whole store behind one bound.
pub trait ShopStore:
    MemberStore + ItemStore + CategoryStore + OrderStore + OrderQueryStore
{
}

impl<T> ShopStore for T where
    T: MemberStore + ItemStore + CategoryStore + OrderStore + OrderQueryStore
{
}
