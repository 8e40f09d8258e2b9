//! Order snapshot utilities
//!
//! - `generate_instance_id`: content-addressed line ids, so re-adding the
//!   same dish with the same modifications merges into one line
//! - `input_to_line_item`: client input → order line
//! - `rebuild_snapshot`: fold an order's events through the appliers

use super::appliers::EventAction;
use super::money;
use super::traits::EventApplier;
use shared::order::{AppliedCoupon, LineItem, LineItemInput, OrderEvent, OrderSnapshot};

/// Generate a content-addressed instance_id from LineItemInput
///
/// The id hashes the properties that make two lines interchangeable:
/// menu item, name, unit price, modifications and notes. Quantity is not
/// part of the identity.
pub fn generate_instance_id(input: &LineItemInput) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();

    hasher.update(input.menu_item_id.unwrap_or(0).to_le_bytes());
    hasher.update(input.name.as_bytes());
    hasher.update([0u8]);
    hasher.update(input.unit_price.to_be_bytes());

    for modification in &input.modifications {
        hasher.update(modification.as_bytes());
        hasher.update([0u8]);
    }
    if let Some(notes) = &input.notes {
        hasher.update([1u8]);
        hasher.update(notes.as_bytes());
    }

    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Convert client input to an order line.
///
/// When the order already carries a coupon for this dish, the new line gets
/// its one-unit discount straight away.
pub fn input_to_line_item(input: &LineItemInput, coupon: Option<&AppliedCoupon>) -> LineItem {
    let coupon_discount = coupon
        .filter(|c| input.menu_item_id == Some(c.menu_item_id))
        .map(|c| money::coupon_unit_discount(input.unit_price, c.percentage))
        .unwrap_or(0.0);

    LineItem {
        instance_id: generate_instance_id(input),
        menu_item_id: input.menu_item_id,
        name: input.name.trim().to_string(),
        unit_price: input.unit_price,
        quantity: input.quantity,
        modifications: input.modifications.clone(),
        notes: input.notes.clone().filter(|n| !n.trim().is_empty()),
        coupon_discount,
    }
}

/// Rebuild a snapshot by replaying events in sequence order
///
/// Returns `None` when there are no events.
pub fn rebuild_snapshot(order_id: &str, events: &[OrderEvent]) -> Option<OrderSnapshot> {
    if events.is_empty() {
        return None;
    }

    let mut ordered: Vec<&OrderEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.sequence);

    let mut snapshot = OrderSnapshot::new(order_id.to_string());
    for event in ordered {
        let applier: EventAction = event.into();
        applier.apply(&mut snapshot, event);
    }
    Some(snapshot)
}
