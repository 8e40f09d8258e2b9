//! DishCouponApplied event applier
//!
//! Sets the per-unit coupon discount on every line of the coupon's menu
//! item. Only one unit of each line is discounted.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// DishCouponApplied applier
pub struct DishCouponAppliedApplier;

impl EventApplier for DishCouponAppliedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::DishCouponApplied { coupon } = &event.payload {
            for item in snapshot.items.iter_mut() {
                item.coupon_discount = if item.menu_item_id == Some(coupon.menu_item_id) {
                    money::coupon_unit_discount(item.unit_price, coupon.percentage)
                } else {
                    0.0
                };
            }
            snapshot.coupon = Some(coupon.clone());

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            money::recalculate_totals(snapshot);
            snapshot.update_checksum();
        }
    }
}
