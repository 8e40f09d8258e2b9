//! OrderConfirmed event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderConfirmed applier: temporary draft becomes ongoing
pub struct OrderConfirmedApplier;

impl EventApplier for OrderConfirmedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderConfirmed = &event.payload {
            snapshot.status = OrderStatus::Ongoing;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
