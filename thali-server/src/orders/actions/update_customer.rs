//! UpdateCustomer command handler

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandErrorCode, CustomerInfo, EventPayload, OrderEvent};

const MAX_CUSTOMER_FIELD_LEN: usize = 100;

/// UpdateCustomer action - replaces the customer name/phone/city
#[derive(Debug, Clone)]
pub struct UpdateCustomerAction {
    pub order_id: String,
    pub customer: CustomerInfo,
}

fn normalize(field: &Option<String>) -> Result<Option<String>, OrderError> {
    let Some(value) = field.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > MAX_CUSTOMER_FIELD_LEN {
        return Err(OrderError::InvalidOperation(
            CommandErrorCode::InvalidOperation,
            format!("customer fields are limited to {MAX_CUSTOMER_FIELD_LEN} characters"),
        ));
    }
    Ok(Some(value.to_string()))
}

impl CommandHandler for UpdateCustomerAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if snapshot.status.is_terminal() {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "update the customer of",
            ));
        }

        let customer = CustomerInfo {
            name: normalize(&self.customer.name)?,
            phone: normalize(&self.customer.phone)?,
            city: normalize(&self.customer.city)?,
        };

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::CustomerUpdated { customer },
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
    use shared::order::OrderStatus;

    #[test]
    fn test_update_customer_trims_fields() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Transferred, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateCustomerAction {
            order_id: "o-1".into(),
            customer: CustomerInfo {
                name: Some("  Ravi ".into()),
                phone: Some("".into()),
                city: Some("Pune".into()),
            },
        };
        let events = action.execute(&mut ctx, &metadata(Role::Staff)).unwrap();
        let EventPayload::CustomerUpdated { customer } = &events[0].payload else {
            panic!("expected CustomerUpdated");
        };
        assert_eq!(customer.name.as_deref(), Some("Ravi"));
        assert_eq!(customer.phone, None);
        assert_eq!(customer.city.as_deref(), Some("Pune"));
    }

    #[test]
    fn test_update_customer_on_cancelled_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Cancelled, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateCustomerAction {
            order_id: "o-1".into(),
            customer: CustomerInfo::default(),
        };
        assert!(matches!(
            action.execute(&mut ctx, &metadata(Role::Staff)),
            Err(OrderError::OrderAlreadyCancelled(_))
        ));
    }

    #[test]
    fn test_update_customer_rejects_long_name() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        store_order(&storage, &txn, "o-1", OrderStatus::Ongoing, vec![], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let action = UpdateCustomerAction {
            order_id: "o-1".into(),
            customer: CustomerInfo {
                name: Some("x".repeat(101)),
                phone: None,
                city: None,
            },
        };
        assert!(action.execute(&mut ctx, &metadata(Role::Staff)).is_err());
    }
}
