//! In-memory store implementation.
//!
//! Keeps the observable semantics of the PostgreSQL implementation
//! (atomically-checked stock decrements, guarded cancellation, identical
//! search behavior) behind a single write lock. Used by unit and API
//! tests, the benchmarks, and the zero-setup run mode.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::{
    Category, CategoryId, DeliveryStatus, Item, ItemId, Member, MemberId, Order, OrderId,
};

use crate::error::{Result, StoreError};
use crate::query::{OrderDetail, OrderGraph, OrderLineDetail, OrderSummary};
use crate::store::{
    CategoryStore, ItemStore, MAX_SEARCH_ROWS, MemberStore, OrderQueryStore, OrderSearch,
    OrderStore,
};

#[derive(Debug, Default)]
struct Inner {
    members: HashMap<MemberId, Member>,
    items: HashMap<ItemId, Item>,
    orders: HashMap<OrderId, Order>,
    categories: HashMap<CategoryId, Category>,
    category_items: Vec<(CategoryId, ItemId)>,
}

impl Inner {
    fn member_name(&self, id: MemberId) -> Result<&str> {
        self.members
            .get(&id)
            .map(|m| m.name.as_str())
            .ok_or_else(|| StoreError::Decode(format!("order references missing member {id}")))
    }

    /// Orders passing the filter, oldest first.
    fn search(&self, search: &OrderSearch) -> Result<Vec<&Order>> {
        let mut matched = Vec::new();
        for order in self.orders.values() {
            let name = self.member_name(order.member_id())?;
            if search.matches(order.status(), name) {
                matched.push(order);
            }
        }
        matched.sort_by_key(|o| o.ordered_at());
        Ok(matched)
    }

    fn graph(&self, order: &Order) -> Result<OrderGraph> {
        let member = self
            .members
            .get(&order.member_id())
            .cloned()
            .ok_or_else(|| {
                StoreError::Decode(format!(
                    "order references missing member {}",
                    order.member_id()
                ))
            })?;
        Ok(OrderGraph {
            order: order.clone(),
            member,
        })
    }

    fn summary(&self, order: &Order) -> Result<OrderSummary> {
        Ok(OrderSummary {
            order_id: order.id(),
            member_name: self.member_name(order.member_id())?.to_string(),
            ordered_at: order.ordered_at(),
            status: order.status(),
            address: order.delivery().address.clone(),
        })
    }

    fn line_details(&self, order: &Order) -> Result<Vec<OrderLineDetail>> {
        order
            .lines()
            .iter()
            .map(|line| {
                let item = self.items.get(&line.item_id).ok_or_else(|| {
                    StoreError::Decode(format!("order line references missing item {}", line.item_id))
                })?;
                Ok(OrderLineDetail {
                    item_name: item.name.clone(),
                    order_price: line.order_price,
                    quantity: line.quantity,
                })
            })
            .collect()
    }
}

/// In-memory store with the trait surface of [`PostgresStore`](crate::PostgresStore).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn insert_member(&self, member: &Member) -> Result<()> {
        self.inner
            .write()
            .await
            .members
            .insert(member.id, member.clone());
        Ok(())
    }

    async fn member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.inner.read().await.members.get(&id).cloned())
    }

    async fn members(&self) -> Result<Vec<Member>> {
        let inner = self.inner.read().await;
        let mut members: Vec<_> = inner.members.values().cloned().collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    async fn members_named(&self, name: &str) -> Result<Vec<Member>> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .values()
            .filter(|m| m.name == name)
            .cloned()
            .collect())
    }

    async fn rename_member(&self, id: MemberId, name: &str) -> Result<()> {
        if let Some(member) = self.inner.write().await.members.get_mut(&id) {
            member.name = name.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn insert_item(&self, item: &Item) -> Result<()> {
        self.inner.write().await.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self.inner.read().await.items.get(&id).cloned())
    }

    async fn items(&self) -> Result<Vec<Item>> {
        let inner = self.inner.read().await;
        let mut items: Vec<_> = inner.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update_item(&self, item: &Item) -> Result<()> {
        if let Some(stored) = self.inner.write().await.items.get_mut(&item.id) {
            stored.name = item.name.clone();
            stored.price = item.price;
            stored.stock_quantity = item.stock_quantity;
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn insert_category(&self, category: &Category) -> Result<()> {
        self.inner
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let inner = self.inner.read().await;
        let mut categories: Vec<_> = inner.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn add_item_to_category(&self, category_id: CategoryId, item_id: ItemId) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.category_items.contains(&(category_id, item_id)) {
            inner.category_items.push((category_id, item_id));
        }
        Ok(())
    }

    async fn items_in_category(&self, category_id: CategoryId) -> Result<Vec<Item>> {
        let inner = self.inner.read().await;
        let mut items: Vec<_> = inner
            .category_items
            .iter()
            .filter(|(c, _)| *c == category_id)
            .filter_map(|(_, i)| inner.items.get(i).cloned())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: &Order) -> Result<()> {
        let mut inner = self.inner.write().await;

        // Apply every decrement to copies first so a failing line leaves
        // the store untouched; lines may repeat an item.
        let mut changed: Vec<Item> = Vec::with_capacity(order.lines().len());
        for line in order.lines() {
            let idx = match changed.iter().position(|i| i.id == line.item_id) {
                Some(idx) => idx,
                None => {
                    let item = inner.items.get(&line.item_id).cloned().ok_or(
                        StoreError::InsufficientStock {
                            item_id: line.item_id,
                        },
                    )?;
                    changed.push(item);
                    changed.len() - 1
                }
            };

            changed[idx]
                .remove_stock(line.quantity)
                .map_err(|_| StoreError::InsufficientStock {
                    item_id: line.item_id,
                })?;
        }

        for item in changed {
            inner.items.insert(item.id, item);
        }
        inner.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn cancel_order(&self, order: &Order) -> Result<()> {
        let mut inner = self.inner.write().await;

        let stored = inner
            .orders
            .get(&order.id())
            .ok_or(StoreError::OrderNotCancellable {
                order_id: order.id(),
            })?;
        if !stored.status().can_cancel() {
            return Err(StoreError::OrderNotCancellable {
                order_id: order.id(),
            });
        }

        for line in order.lines() {
            if let Some(item) = inner.items.get_mut(&line.item_id) {
                line.cancel(item);
            }
        }
        inner.orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn update_delivery(&self, order_id: OrderId, status: DeliveryStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(order) = inner.orders.get(&order_id) {
            let mut delivery = order.delivery().clone();
            delivery.status = status;
            let updated = Order::restore(
                order.id(),
                order.member_id(),
                order.lines().to_vec(),
                delivery,
                order.ordered_at(),
                order.status(),
            );
            inner.orders.insert(order_id, updated);
        }
        Ok(())
    }

    async fn orders(&self, search: &OrderSearch) -> Result<Vec<OrderGraph>> {
        let inner = self.inner.read().await;
        inner
            .search(search)?
            .into_iter()
            .take(MAX_SEARCH_ROWS as usize)
            .map(|order| inner.graph(order))
            .collect()
    }

    async fn orders_with_lines(&self, search: &OrderSearch) -> Result<Vec<OrderGraph>> {
        // A single in-process map has no round trips to save; the joined
        // strategy only differs on the SQL side.
        let inner = self.inner.read().await;
        inner
            .search(search)?
            .into_iter()
            .map(|order| inner.graph(order))
            .collect()
    }

    async fn orders_paged(
        &self,
        search: &OrderSearch,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<OrderGraph>> {
        let inner = self.inner.read().await;
        inner
            .search(search)?
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|order| inner.graph(order))
            .collect()
    }
}

#[async_trait]
impl OrderQueryStore for MemoryStore {
    async fn order_summaries(&self, search: &OrderSearch) -> Result<Vec<OrderSummary>> {
        let inner = self.inner.read().await;
        inner
            .search(search)?
            .into_iter()
            .map(|order| inner.summary(order))
            .collect()
    }

    async fn order_details(&self, search: &OrderSearch) -> Result<Vec<OrderDetail>> {
        let inner = self.inner.read().await;
        inner
            .search(search)?
            .into_iter()
            .map(|order| {
                let summary = inner.summary(order)?;
                Ok(OrderDetail {
                    order_id: summary.order_id,
                    member_name: summary.member_name,
                    ordered_at: summary.ordered_at,
                    status: summary.status,
                    address: summary.address,
                    lines: inner.line_details(order)?,
                })
            })
            .collect()
    }
}
