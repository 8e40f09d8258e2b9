//! TransferOrder command handler ("go for bill")
//!
//! Hands an ongoing order to a manager. The pending record and the status
//! change commit together.

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderStatus, PendingRecord};

/// TransferOrder action
#[derive(Debug, Clone)]
pub struct TransferOrderAction {
    pub order_id: String,
}

impl CommandHandler for TransferOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate
        if snapshot.status != OrderStatus::Ongoing {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "transfer",
            ));
        }
        if snapshot.items.is_empty() {
            return Err(OrderError::OrderEmpty(self.order_id.clone()));
        }
        if ctx.pending_record(&self.order_id)?.is_some() {
            return Err(OrderError::PendingRecordExists(self.order_id.clone()));
        }

        // 3. Pending record for the manager queue
        let record = PendingRecord::from_snapshot(
            &snapshot,
            metadata.operator_id,
            metadata.operator_name.clone(),
            shared::util::now_millis(),
        );
        ctx.put_pending_record(&record)?;

        tracing::info!(
            order_id = %self.order_id,
            order_number = %snapshot.order_number,
            total = snapshot.total,
            "Order transferred for billing"
        );

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderTransferred {
                total: snapshot.total,
            },
        );
        Ok(vec![event])
    }
}
