//! ItemsAdded event applier
//!
//! Applies the ItemsAdded event to add items to the snapshot.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, LineItem, OrderEvent, OrderSnapshot};

/// ItemsAdded applier
pub struct ItemsAddedApplier;

impl EventApplier for ItemsAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemsAdded { items } = &event.payload {
            // Merge if same instance_id exists
            for item in items {
                add_or_merge_item(snapshot, item);
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            money::recalculate_totals(snapshot);
            snapshot.update_checksum();
        }
    }
}

/// Add item to snapshot, merging with existing item if instance_id matches.
///
/// A merged line keeps its coupon discount: the coupon covers one unit per
/// line however many units are added.
pub(crate) fn add_or_merge_item(snapshot: &mut OrderSnapshot, item: &LineItem) {
    if let Some(existing) = snapshot
        .items
        .iter_mut()
        .find(|i| i.instance_id == item.instance_id)
    {
        existing.quantity += item.quantity;
    } else {
        snapshot.items.push(item.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_support::{event, line};
    use shared::order::TaxRates;

    #[test]
    fn test_items_added_applier_single_item() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.tax = TaxRates {
            cgst_percent: 2.5,
            sgst_percent: 2.5,
        };

        let e = event(
            "order-1",
            2,
            EventPayload::ItemsAdded {
                items: vec![line("item-1", "Tea", 20.0, 2)],
            },
        );
        ItemsAddedApplier.apply(&mut snapshot, &e);

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 2);
        assert_eq!(snapshot.subtotal, 40.0);
        assert_eq!(snapshot.cgst, 1.0);
        assert_eq!(snapshot.sgst, 1.0);
        assert_eq!(snapshot.total, 42.0);
        assert_eq!(snapshot.last_sequence, 2);
    }

    #[test]
    fn test_items_added_merges_same_instance() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        let mut first = line("item-1", "Biryani", 169.0, 1);
        first.coupon_discount = 16.0;
        snapshot.items.push(first);

        let e = event(
            "order-1",
            3,
            EventPayload::ItemsAdded {
                items: vec![
                    line("item-1", "Biryani", 169.0, 2),
                    line("item-2", "Lassi", 60.0, 1),
                ],
            },
        );
        ItemsAddedApplier.apply(&mut snapshot, &e);

        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].quantity, 3);
        assert_eq!(snapshot.items[0].coupon_discount, 16.0);
        assert_eq!(snapshot.subtotal, 567.0);
        assert_eq!(snapshot.discount, 16.0);
    }
}
