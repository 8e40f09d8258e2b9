//! OrderTransferred event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderTransferred applier
pub struct OrderTransferredApplier;

impl EventApplier for OrderTransferredApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderTransferred { .. } = &event.payload {
            snapshot.status = OrderStatus::Transferred;
            snapshot.transferred_at = Some(event.timestamp);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
