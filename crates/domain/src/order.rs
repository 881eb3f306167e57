//! Order lifecycle: placement, cancellation, total price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::delivery::{Delivery, DeliveryStatus};
use crate::error::DomainError;
use crate::ids::{ItemId, MemberId, OrderId, OrderLineId};
use crate::item::Item;

/// The state of an order.
///
/// The only transition is ORDERED → CANCELLED; cancelled orders stay
/// cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed and not cancelled.
    #[default]
    Ordered,

    /// Cancelled; stock has been restored (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if an order in this state can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Ordered)
    }

    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Ordered => "ORDERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDERED" => Ok(OrderStatus::Ordered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// One line of an order: an item reference, the unit price at order time,
/// and the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub item_id: ItemId,
    /// Unit price captured when the order was placed; later catalog price
    /// changes do not affect existing orders.
    pub order_price: i64,
    pub quantity: u32,
}

impl OrderLine {
    /// Creates an order line, taking the ordered quantity out of the item's
    /// stock in the same step.
    ///
    /// Line creation and the stock decrement are inseparable; there is no
    /// way to build a line without paying for it in stock.
    pub fn create(item: &mut Item, order_price: i64, quantity: u32) -> Result<Self, DomainError> {
        item.remove_stock(quantity)?;

        Ok(Self {
            id: OrderLineId::new(),
            item_id: item.id,
            order_price,
            quantity,
        })
    }

    /// Puts the ordered quantity back into the item's stock. Inverse of
    /// [`OrderLine::create`].
    pub fn cancel(&self, item: &mut Item) {
        item.add_stock(self.quantity);
    }

    /// Returns `order_price * quantity` for this line.
    pub fn total_price(&self) -> i64 {
        self.order_price * i64::from(self.quantity)
    }
}

/// An order: the member reference, the owned lines and delivery, the order
/// timestamp, and the status.
///
/// Fields are private; orders come into existence only through
/// [`Order::place`] (or [`Order::restore`] when rehydrated from storage),
/// so an order in an invalid state cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    member_id: MemberId,
    lines: Vec<OrderLine>,
    delivery: Delivery,
    ordered_at: DateTime<Utc>,
    status: OrderStatus,
}

impl Order {
    /// Assembles a new order in ORDERED state.
    ///
    /// The lines must already have been created through
    /// [`OrderLine::create`], i.e. stock is already accounted for.
    pub fn place(
        member_id: MemberId,
        delivery: Delivery,
        lines: Vec<OrderLine>,
        ordered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            member_id,
            lines,
            delivery,
            ordered_at,
            status: OrderStatus::Ordered,
        }
    }

    /// Reassembles an order previously written to storage. Not a way to
    /// create new business state.
    pub fn restore(
        id: OrderId,
        member_id: MemberId,
        lines: Vec<OrderLine>,
        delivery: Delivery,
        ordered_at: DateTime<Utc>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id,
            member_id,
            lines,
            delivery,
            ordered_at,
            status,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Marks the delivery of this order COMPLETED.
    pub fn complete_delivery(&mut self) -> Result<(), DomainError> {
        self.delivery.complete()
    }

    /// Cancels the order.
    ///
    /// Fails once the delivery has COMPLETED, and on an order that is
    /// already CANCELLED (cancelling twice would restore stock twice).
    /// The caller is responsible for putting every line's quantity back
    /// into stock, see [`OrderLine::cancel`].
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.delivery.status == DeliveryStatus::Completed {
            return Err(DomainError::InvalidState {
                action: "cancel order",
                state: "delivery already completed",
            });
        }

        if !self.status.can_cancel() {
            return Err(DomainError::InvalidState {
                action: "cancel order",
                state: "order already cancelled",
            });
        }

        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    /// Sum of `order_price * quantity` over all lines. Pure read.
    pub fn total_price(&self) -> i64 {
        self.lines.iter().map(OrderLine::total_price).sum()
    }
}
