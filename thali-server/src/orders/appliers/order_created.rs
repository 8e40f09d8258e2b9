//! OrderCreated event applier
//!
//! Initializes the snapshot from the creation event.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderCreated applier
pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            location_id,
            order_number,
            order_type,
            table_ids,
            tax,
            initial_status,
            customer,
        } = &event.payload
        {
            snapshot.order_id = event.order_id.clone();
            snapshot.location_id = *location_id;
            snapshot.order_number = order_number.clone();
            snapshot.order_type = *order_type;
            snapshot.table_ids = table_ids.clone();
            snapshot.tax = *tax;
            snapshot.status = *initial_status;
            snapshot.customer = customer.clone().filter(|c| !c.is_empty());

            snapshot.staff_id = event.operator_id;
            snapshot.staff_name = event.operator_name.clone();
            snapshot.created_at = event.timestamp;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            money::recalculate_totals(snapshot);
            snapshot.update_checksum();
        }
    }
}
