//! OrderSettled event applier
//!
//! Records the payment and closes the order. Table release already happened
//! in the settling transaction; the event only lists the released ids.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderSettled applier
pub struct OrderSettledApplier;

impl EventApplier for OrderSettledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderSettled { payment, .. } = &event.payload {
            snapshot.status = OrderStatus::Settled;
            snapshot.payment = Some(payment.clone());
            snapshot.settled_at = Some(event.timestamp);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::event;
    use shared::order::{PaymentMethod, PaymentRecord};

    #[test]
    fn test_order_settled_records_payment() {
        let mut snapshot = OrderSnapshot::new("order-1".into());
        snapshot.status = OrderStatus::PendingSettlement;
        snapshot.total = 42.0;

        let e = event(
            "order-1",
            11,
            EventPayload::OrderSettled {
                payment: PaymentRecord {
                    method: PaymentMethod::Cash,
                    amount: 42.0,
                    tendered: 50.0,
                    change: 8.0,
                    recorded_by: 7,
                    recorded_at: 1_000,
                },
                released_table_ids: vec![1],
            },
        );
        OrderSettledApplier.apply(&mut snapshot, &e);

        assert_eq!(snapshot.status, OrderStatus::Settled);
        assert_eq!(snapshot.settled_at, Some(e.timestamp));
        let payment = snapshot.payment.unwrap();
        assert_eq!(payment.change, 8.0);
        assert_eq!(payment.method, PaymentMethod::Cash);
    }
}
