//! ConfirmOrder command handler

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderStatus};

/// ConfirmOrder action: `temporary` → `ongoing`
#[derive(Debug, Clone)]
pub struct ConfirmOrderAction {
    pub order_id: String,
}

impl CommandHandler for ConfirmOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if snapshot.status != OrderStatus::Temporary {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "confirm",
            ));
        }

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderConfirmed,
        );
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::*;
    use crate::orders::storage::OrderStorage;
    use shared::models::Role;

    #[test]
    fn test_confirm_temporary_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Temporary, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 3);
        let action = ConfirmOrderAction {
            order_id: "o-1".into(),
        };
        let events = action.execute(&mut ctx, &metadata(Role::Staff)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 4);
        assert!(matches!(events[0].payload, EventPayload::OrderConfirmed));
    }

    #[test]
    fn test_confirm_twice_is_invalid() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Ongoing, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = ConfirmOrderAction {
            order_id: "o-1".into(),
        };
        let err = action
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition { .. }));
    }
}
