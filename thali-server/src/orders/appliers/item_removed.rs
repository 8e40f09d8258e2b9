//! ItemRemoved event applier
//!
//! Removes the whole line identified by `instance_id`.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemRemoved applier
pub struct ItemRemovedApplier;

impl EventApplier for ItemRemovedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemRemoved { instance_id, .. } = &event.payload {
            snapshot.items.retain(|i| &i.instance_id != instance_id);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            money::recalculate_totals(snapshot);
            snapshot.update_checksum();
        }
    }
}
