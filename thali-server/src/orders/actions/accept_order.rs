//! AcceptOrder command handler
//!
//! A manager takes a transferred order: `transferred` → `pending_settlement`,
//! and the pending record is stamped with who accepted it.

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderStatus};

/// AcceptOrder action
#[derive(Debug, Clone)]
pub struct AcceptOrderAction {
    pub order_id: String,
}

impl CommandHandler for AcceptOrderAction {
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
                "accept",
            ));
        }

        let mut record = ctx
            .pending_record(&self.order_id)?
            .ok_or_else(|| OrderError::PendingRecordNotFound(self.order_id.clone()))?;
        record.accepted_by = Some(metadata.operator_id);
        record.accepted_by_name = Some(metadata.operator_name.clone());
        record.accepted_at = Some(shared::util::now_millis());
        ctx.put_pending_record(&record)?;

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderAccepted {
                manager_id: metadata.operator_id,
                manager_name: metadata.operator_name.clone(),
            },
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
    use shared::order::PendingRecord;

    fn accept() -> AcceptOrderAction {
        AcceptOrderAction {
            order_id: "o-1".into(),
        }
    }

    #[test]
    fn test_accept_stamps_pending_record() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let snapshot = store_order(
            &storage,
            &txn,
            "o-1",
            OrderStatus::Transferred,
            vec![],
            vec![line("tea", 1, 20.0, 2)],
        );
        storage
            .store_pending_record(&txn, &PendingRecord::from_snapshot(&snapshot, 3, "Vikram", 1))
            .unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let events = accept()
            .execute(&mut ctx, &metadata(Role::Manager))
            .unwrap();
        assert!(matches!(
            events[0].payload,
            EventPayload::OrderAccepted { manager_id: 7, .. }
        ));

        let record = storage.get_pending_record_txn(&txn, "o-1").unwrap().unwrap();
        assert_eq!(record.accepted_by, Some(7));
        assert_eq!(record.accepted_by_name.as_deref(), Some("Asha"));
        assert!(record.accepted_at.is_some());
    }

    #[test]
    fn test_accept_requires_transferred() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Ongoing, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        assert!(matches!(
            accept().execute(&mut ctx, &metadata(Role::Manager)),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_accept_without_pending_record() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Transferred, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        assert!(matches!(
            accept().execute(&mut ctx, &metadata(Role::Manager)),
            Err(OrderError::PendingRecordNotFound(_))
        ));
    }
}
