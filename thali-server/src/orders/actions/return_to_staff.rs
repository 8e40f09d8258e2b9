//! ReturnToStaff command handler
//!
//! A manager sends a transferred order back for edits: `transferred` →
//! `ongoing`, and the pending record goes away in the same transaction.

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderStatus};

/// ReturnToStaff action
#[derive(Debug, Clone)]
pub struct ReturnToStaffAction {
    pub order_id: String,
    pub reason: Option<String>,
}

impl CommandHandler for ReturnToStaffAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if snapshot.status != OrderStatus::Transferred {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "return",
            ));
        }
        if !ctx.remove_pending_record(&self.order_id)? {
            return Err(OrderError::PendingRecordNotFound(self.order_id.clone()));
        }

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::TransferReturned {
                reason: self.reason.clone().filter(|r| !r.trim().is_empty()),
            },
        );
        Ok(vec![event])
    }
}
