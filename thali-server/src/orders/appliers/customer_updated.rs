//! CustomerUpdated event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// CustomerUpdated applier; an empty customer clears the details
pub struct CustomerUpdatedApplier;

impl EventApplier for CustomerUpdatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::CustomerUpdated { customer } = &event.payload {
            snapshot.customer = Some(customer.clone()).filter(|c| !c.is_empty());

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
