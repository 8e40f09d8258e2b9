//! OrderAccepted event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderAccepted applier
pub struct OrderAcceptedApplier;

impl EventApplier for OrderAcceptedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderAccepted { manager_id, .. } = &event.payload {
            snapshot.status = OrderStatus::PendingSettlement;
            snapshot.accepted_by = Some(*manager_id);
            snapshot.accepted_at = Some(event.timestamp);

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
