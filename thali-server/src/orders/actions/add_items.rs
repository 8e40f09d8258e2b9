//! AddItems command handler

use crate::orders::money;
use crate::orders::reducer::input_to_line_item;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandErrorCode, EventPayload, LineItemInput, OrderEvent};

/// AddItems action
#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub order_id: String,
    pub items: Vec<LineItemInput>,
}

impl CommandHandler for AddItemsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate order status
        if !snapshot.status.is_editable() {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "add items to",
            ));
        }

        // 3. Validate items
        if self.items.is_empty() {
            return Err(OrderError::InvalidOperation(
                CommandErrorCode::InvalidOperation,
                "no items to add".to_string(),
            ));
        }
        for item in &self.items {
            money::validate_line_item(item)?;
        }

        // 4. Lines pick up the order's coupon when it matches their dish
        let items = self
            .items
            .iter()
            .map(|input| input_to_line_item(input, snapshot.coupon.as_ref()))
            .collect();

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::ItemsAdded { items },
        );
        Ok(vec![event])
    }
}
