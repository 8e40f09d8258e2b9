//! RemoveItem command handler

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent};

/// RemoveItem action - drops a whole line
#[derive(Debug, Clone)]
pub struct RemoveItemAction {
    pub order_id: String,
    pub instance_id: String,
}

impl CommandHandler for RemoveItemAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if !snapshot.status.is_editable() {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "remove items from",
            ));
        }

        let item = snapshot
            .find_item(&self.instance_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.instance_id.clone()))?;

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::ItemRemoved {
                instance_id: self.instance_id.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
            },
        );
        Ok(vec![event])
    }
}
