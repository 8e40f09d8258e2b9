//! ModifyItemQuantity command handler

use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent};

/// ModifyItemQuantity action
///
/// Sets the absolute quantity of one line. Use RemoveItem to drop a line.
#[derive(Debug, Clone)]
pub struct ModifyItemQuantityAction {
    pub order_id: String,
    pub instance_id: String,
    pub quantity: u32,
}

impl CommandHandler for ModifyItemQuantityAction {
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
                "modify items of",
            ));
        }

        let item = snapshot
            .find_item(&self.instance_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.instance_id.clone()))?;
        money::validate_quantity(self.quantity)?;

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::ItemQuantityChanged {
                instance_id: self.instance_id.clone(),
                name: item.name.clone(),
                previous_quantity: item.quantity,
                quantity: self.quantity,
            },
        );
        Ok(vec![event])
    }
}
