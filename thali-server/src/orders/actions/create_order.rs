//! CreateOrder command handler
//!
//! Opens a new order at a location. Dine-in orders claim their tables in the
//! same transaction; the order number comes from the per-location daily
//! counter in the business timezone.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::db::collection;
use crate::orders::money;
use crate::orders::occupancy;
use crate::orders::reducer::input_to_line_item;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::Location;
use shared::order::{
    CommandErrorCode, CustomerInfo, EventPayload, LineItemInput, OrderEvent, OrderStatus,
    OrderType, TaxRates,
};

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub location_id: i64,
    pub order_type: OrderType,
    pub table_ids: Vec<i64>,
    pub items: Vec<LineItemInput>,
    pub customer: Option<CustomerInfo>,
    /// `false` keeps the order `temporary` until it is confirmed
    pub confirm: bool,
    pub tz: Tz,
}

/// `{PREFIX}-{YYYYMMDD}-{NNNN}`
pub fn format_order_number(prefix: &str, date: NaiveDate, counter: u64) -> String {
    format!("{}-{}-{:04}", prefix, date.format("%Y%m%d"), counter)
}

impl CommandHandler for CreateOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Location must exist and be open
        let location = collection::get_in::<Location>(ctx.txn(), self.location_id)?
            .filter(|l| l.is_active)
            .ok_or(OrderError::LocationNotFound(self.location_id))?;

        // 2. Validate shape of the order
        let mut table_ids = self.table_ids.clone();
        table_ids.sort_unstable();
        table_ids.dedup();
        match self.order_type {
            OrderType::DineIn if table_ids.is_empty() => {
                return Err(OrderError::InvalidOperation(
                    CommandErrorCode::InvalidOperation,
                    "dine-in orders need at least one table".to_string(),
                ));
            }
            OrderType::Delivery if !table_ids.is_empty() => {
                return Err(OrderError::InvalidOperation(
                    CommandErrorCode::InvalidOperation,
                    "delivery orders cannot hold tables".to_string(),
                ));
            }
            _ => {}
        }
        for item in &self.items {
            money::validate_line_item(item)?;
        }

        // 3. Occupy tables
        let now = shared::util::now_millis();
        occupancy::claim_tables(ctx, location.id, &table_ids, now)?;

        // 4. Order number from the business day
        let business_day = Utc::now().with_timezone(&self.tz).date_naive();
        let date_key = business_day.year() as u32 * 10_000
            + business_day.month() * 100
            + business_day.day();
        let counter = ctx.next_order_number(location.id, date_key)?;
        let order_number = format_order_number(&location.order_prefix, business_day, counter);
        let order_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(
            order_id = %order_id,
            order_number = %order_number,
            location_id = location.id,
            tables = ?table_ids,
            "Creating order"
        );

        // 5. Events
        let initial_status = if self.confirm {
            OrderStatus::Ongoing
        } else {
            OrderStatus::Temporary
        };
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderCreated {
                location_id: location.id,
                order_number,
                order_type: self.order_type,
                table_ids,
                tax: TaxRates {
                    cgst_percent: location.cgst_percent,
                    sgst_percent: location.sgst_percent,
                },
                initial_status,
                customer: self.customer.clone().filter(|c| !c.is_empty()),
            },
        )];

        if !self.items.is_empty() {
            let items = self
                .items
                .iter()
                .map(|input| input_to_line_item(input, None))
                .collect();
            events.push(OrderEvent::new(
                ctx.next_sequence(),
                order_id,
                metadata.operator_id,
                metadata.operator_name.clone(),
                metadata.command_id.clone(),
                Some(metadata.timestamp),
                EventPayload::ItemsAdded { items },
            ));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::*;
    use crate::orders::storage::OrderStorage;
    use shared::models::{Role, TableStatus};

    fn action(order_type: OrderType, table_ids: Vec<i64>) -> CreateOrderAction {
        CreateOrderAction {
            location_id: LOCATION_ID,
            order_type,
            table_ids,
            items: vec![LineItemInput {
                menu_item_id: Some(1),
                name: "Tea".into(),
                unit_price: 20.0,
                quantity: 2,
                modifications: vec![],
                notes: None,
            }],
            customer: None,
            confirm: true,
            tz: chrono_tz::Asia::Kolkata,
        }
    }

    #[test]
    fn test_create_dine_in_claims_tables() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_location(&txn);
        seed_table(&txn, 1, TableStatus::Available);
        seed_table(&txn, 2, TableStatus::Reserved);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let events = action(OrderType::DineIn, vec![2, 1, 2])
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        match &events[0].payload {
            EventPayload::OrderCreated {
                order_number,
                table_ids,
                initial_status,
                tax,
                ..
            } => {
                assert!(order_number.starts_with("BLR1-"));
                assert!(order_number.ends_with("-0001"));
                assert_eq!(table_ids, &vec![1, 2]);
                assert_eq!(*initial_status, OrderStatus::Ongoing);
                assert_eq!(tax.cgst_percent, 2.5);
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(table(&txn, 1).status, TableStatus::Occupied);
        assert_eq!(table(&txn, 2).status, TableStatus::Occupied);
    }

    #[test]
    fn test_order_numbers_count_up() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_location(&txn);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let meta = metadata(Role::Staff);
        let first = action(OrderType::Delivery, vec![]).execute(&mut ctx, &meta).unwrap();
        let second = action(OrderType::Delivery, vec![]).execute(&mut ctx, &meta).unwrap();

        let number = |events: &[OrderEvent]| match &events[0].payload {
            EventPayload::OrderCreated { order_number, .. } => order_number.clone(),
            _ => unreachable!(),
        };
        assert!(number(&first).ends_with("-0001"));
        assert!(number(&second).ends_with("-0002"));
    }

    #[test]
    fn test_dine_in_without_tables_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_location(&txn);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let err = action(OrderType::DineIn, vec![])
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::InvalidOperation);

        let err = action(OrderType::Delivery, vec![1])
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap_err();
        assert_eq!(err.code(), CommandErrorCode::InvalidOperation);
    }

    #[test]
    fn test_occupied_table_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_location(&txn);
        seed_table(&txn, 1, TableStatus::Available);
        store_order(&storage, &txn, "held", OrderStatus::Ongoing, vec![1], vec![]);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let err = action(OrderType::DineIn, vec![1])
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap_err();
        assert!(matches!(err, OrderError::TableOccupied(_)));
    }

    #[test]
    fn test_unknown_location_and_table() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let err = action(OrderType::Delivery, vec![])
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap_err();
        assert!(matches!(err, OrderError::LocationNotFound(LOCATION_ID)));

        seed_location(&txn);
        let err = action(OrderType::DineIn, vec![99])
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap_err();
        assert!(matches!(err, OrderError::TableNotFound(99)));
    }

    #[test]
    fn test_unconfirmed_order_starts_temporary() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_location(&txn);

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let mut unconfirmed = action(OrderType::Delivery, vec![]);
        unconfirmed.confirm = false;
        unconfirmed.items.clear();
        let events = unconfirmed
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::OrderCreated {
                initial_status: OrderStatus::Temporary,
                ..
            }
        ));
    }

    #[test]
    fn test_format_order_number() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
        assert_eq!(format_order_number("BLR1", date, 7), "BLR1-20250114-0007");
        assert_eq!(format_order_number("X", date, 12345), "X-20250114-12345");
    }
}
