//! Order placement and cancellation.

use chrono::Utc;
use domain::{Delivery, ItemId, MemberId, Order, OrderId, OrderLine};
use store::ShopStore;

use crate::error::ServiceError;

/// Service for placing and cancelling orders.
pub struct OrderService<S: ShopStore> {
    store: S,
}

impl<S: ShopStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order of `quantity` units of one item for a member.
    ///
    /// The order line captures the item's current price; the stock
    /// decrement happens atomically with persisting the order, not as a
    /// separate step. The delivery goes to the member's address in READY
    /// state.
    #[tracing::instrument(skip(self))]
    pub async fn place(
        &self,
        member_id: MemberId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<OrderId, ServiceError> {
        let member = self
            .store
            .member(member_id)
            .await?
            .ok_or(ServiceError::MemberNotFound(member_id))?;
        let mut item = self
            .store
            .item(item_id)
            .await?
            .ok_or(ServiceError::ItemNotFound(item_id))?;

        // Fails fast on the loaded item; the store re-checks the decrement
        // when the order is written.
        let unit_price = item.price;
        let line = OrderLine::create(&mut item, unit_price, quantity)?;

        let order = Order::place(
            member.id,
            Delivery::ready(member.address.clone()),
            vec![line],
            Utc::now(),
        );
        self.store.create_order(&order).await?;

        metrics::counter!("orders_placed_total").increment(1);
        Ok(order.id())
    }

    /// Cancels an order and restores the stock its lines deducted.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<(), ServiceError> {
        let mut order = self.order(order_id).await?;

        order.cancel()?;
        self.store.cancel_order(&order).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(())
    }

    /// Marks an order's delivery COMPLETED.
    #[tracing::instrument(skip(self))]
    pub async fn complete_delivery(&self, order_id: OrderId) -> Result<(), ServiceError> {
        let mut order = self.order(order_id).await?;

        order.complete_delivery()?;
        self.store
            .update_delivery(order_id, order.delivery().status)
            .await?;
        Ok(())
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        self.store
            .order(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))
    }
}
