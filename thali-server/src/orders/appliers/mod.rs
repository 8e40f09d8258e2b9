//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions: replaying an
//! order's events through them reproduces its stored snapshot.

use enum_dispatch::enum_dispatch;

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

mod customer_updated;
mod dish_coupon_applied;
mod item_quantity_changed;
mod item_removed;
mod items_added;
mod order_accepted;
mod order_cancelled;
mod order_confirmed;
mod order_created;
mod order_settled;
mod order_transferred;
mod transfer_returned;

pub use customer_updated::CustomerUpdatedApplier;
pub use dish_coupon_applied::DishCouponAppliedApplier;
pub use item_quantity_changed::ItemQuantityChangedApplier;
pub use item_removed::ItemRemovedApplier;
pub use items_added::ItemsAddedApplier;
pub use order_accepted::OrderAcceptedApplier;
pub use order_cancelled::OrderCancelledApplier;
pub use order_confirmed::OrderConfirmedApplier;
pub use order_created::OrderCreatedApplier;
pub use order_settled::OrderSettledApplier;
pub use order_transferred::OrderTransferredApplier;
pub use transfer_returned::TransferReturnedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    OrderConfirmed(OrderConfirmedApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemQuantityChanged(ItemQuantityChangedApplier),
    ItemRemoved(ItemRemovedApplier),
    CustomerUpdated(CustomerUpdatedApplier),
    DishCouponApplied(DishCouponAppliedApplier),
    OrderTransferred(OrderTransferredApplier),
    TransferReturned(TransferReturnedApplier),
    OrderAccepted(OrderAcceptedApplier),
    OrderSettled(OrderSettledApplier),
    OrderCancelled(OrderCancelledApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::OrderConfirmed => EventAction::OrderConfirmed(OrderConfirmedApplier),
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemQuantityChanged { .. } => {
                EventAction::ItemQuantityChanged(ItemQuantityChangedApplier)
            }
            EventPayload::ItemRemoved { .. } => EventAction::ItemRemoved(ItemRemovedApplier),
            EventPayload::CustomerUpdated { .. } => {
                EventAction::CustomerUpdated(CustomerUpdatedApplier)
            }
            EventPayload::DishCouponApplied { .. } => {
                EventAction::DishCouponApplied(DishCouponAppliedApplier)
            }
            EventPayload::OrderTransferred { .. } => {
                EventAction::OrderTransferred(OrderTransferredApplier)
            }
            EventPayload::TransferReturned { .. } => {
                EventAction::TransferReturned(TransferReturnedApplier)
            }
            EventPayload::OrderAccepted { .. } => EventAction::OrderAccepted(OrderAcceptedApplier),
            EventPayload::OrderSettled { .. } => EventAction::OrderSettled(OrderSettledApplier),
            EventPayload::OrderCancelled { .. } => {
                EventAction::OrderCancelled(OrderCancelledApplier)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use shared::order::{EventPayload, LineItem, OrderEvent};

    pub fn event(order_id: &str, seq: u64, payload: EventPayload) -> OrderEvent {
        OrderEvent::new(
            seq,
            order_id.to_string(),
            7,
            "Asha".to_string(),
            format!("cmd-{seq}"),
            Some(1_700_000_000_000),
            payload,
        )
    }

    pub fn line(instance_id: &str, name: &str, unit_price: f64, quantity: u32) -> LineItem {
        LineItem {
            instance_id: instance_id.to_string(),
            menu_item_id: Some(100),
            name: name.to_string(),
            unit_price,
            quantity,
            modifications: vec![],
            notes: None,
            coupon_discount: 0.0,
        }
    }
}
