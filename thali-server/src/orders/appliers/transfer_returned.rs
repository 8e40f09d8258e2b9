//! TransferReturned event applier
//!
//! A manager sent the order back: staff may edit it again and must transfer
//! it anew before it can be settled.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// TransferReturned applier
pub struct TransferReturnedApplier;

impl EventApplier for TransferReturnedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TransferReturned { .. } = &event.payload {
            snapshot.status = OrderStatus::Ongoing;
            snapshot.transferred_at = None;
            snapshot.accepted_by = None;
            snapshot.accepted_at = None;

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

    #[test]
    fn test_return_clears_transfer_state() {
        let mut snapshot = OrderSnapshot::new("order-1".into());
        snapshot.status = OrderStatus::Transferred;
        snapshot.transferred_at = Some(5);

        let e = event(
            "order-1",
            9,
            EventPayload::TransferReturned {
                reason: Some("wrong table".into()),
            },
        );
        TransferReturnedApplier.apply(&mut snapshot, &e);

        assert_eq!(snapshot.status, OrderStatus::Ongoing);
        assert!(snapshot.transferred_at.is_none());
        assert_eq!(snapshot.last_sequence, 9);
    }
}
