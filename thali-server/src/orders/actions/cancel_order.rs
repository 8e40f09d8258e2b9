//! CancelOrder command handler
//!
//! Any non-terminal order can be cancelled by a role holding
//! `orders:cancel`. Staff may cancel only their own orders that have not
//! been transferred yet.

use crate::orders::occupancy;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::may_cancel;
use shared::order::{EventPayload, OrderEvent, OrderStatus};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: Option<String>,
}

impl CommandHandler for CancelOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate status and who is asking
        if snapshot.status.is_terminal() {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "cancel",
            ));
        }
        let is_own = snapshot.staff_id == metadata.operator_id;
        let before_transfer = matches!(
            snapshot.status,
            OrderStatus::Temporary | OrderStatus::Ongoing
        );
        if !may_cancel(metadata.role, is_own, before_transfer) {
            return Err(OrderError::PermissionDenied(format!(
                "{} may not cancel order {}",
                metadata.role.as_str(),
                snapshot.order_number
            )));
        }

        // 3. Drop the pending record, if any
        if ctx.remove_pending_record(&self.order_id)? {
            tracing::debug!(order_id = %self.order_id, "Pending record removed on cancel");
        }

        // 4. Release tables
        let released_table_ids =
            occupancy::release_tables_if_unreferenced(ctx, &snapshot.table_ids, &self.order_id)?;

        tracing::info!(
            order_id = %self.order_id,
            order_number = %snapshot.order_number,
            from = %snapshot.status,
            released = ?released_table_ids,
            "Order cancelled"
        );

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderCancelled {
                reason: self.reason.clone().filter(|r| !r.trim().is_empty()),
                released_table_ids,
            },
        );
        Ok(vec![event])
    }
}
