//! ItemQuantityChanged event applier

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemQuantityChanged applier
pub struct ItemQuantityChangedApplier;

impl EventApplier for ItemQuantityChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemQuantityChanged {
            instance_id,
            quantity,
            ..
        } = &event.payload
        {
            if let Some(item) = snapshot
                .items
                .iter_mut()
                .find(|i| &i.instance_id == instance_id)
            {
                item.quantity = *quantity;
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            money::recalculate_totals(snapshot);
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{event, line};

    #[test]
    fn test_quantity_change_recalculates() {
        let mut snapshot = OrderSnapshot::new("order-1".into());
        snapshot.items.push(line("item-1", "Tea", 20.0, 2));

        let e = event(
            "order-1",
            4,
            EventPayload::ItemQuantityChanged {
                instance_id: "item-1".into(),
                name: "Tea".into(),
                previous_quantity: 2,
                quantity: 5,
            },
        );
        ItemQuantityChangedApplier.apply(&mut snapshot, &e);

        assert_eq!(snapshot.items[0].quantity, 5);
        assert_eq!(snapshot.subtotal, 100.0);
        assert_eq!(snapshot.last_sequence, 4);
    }
}
