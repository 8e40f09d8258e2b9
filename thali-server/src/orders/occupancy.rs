//! Table occupancy coupling
//!
//! A table is `occupied` iff at least one non-terminal order references it.
//! Only the order engine writes that status, and always inside the command's
//! write transaction.

use shared::models::{DiningTable, TableStatus};

use super::traits::{CommandContext, OrderError};
use crate::db::collection;

/// Check and occupy the tables of a new dine-in order.
///
/// Every table must belong to `location_id`, be active, read as `available`
/// or `reserved`, and not be referenced by another non-terminal order.
pub fn claim_tables(
    ctx: &CommandContext<'_>,
    location_id: i64,
    table_ids: &[i64],
    now: i64,
) -> Result<Vec<DiningTable>, OrderError> {
    let mut claimed = Vec::with_capacity(table_ids.len());
    for &table_id in table_ids {
        let table = collection::get_in::<DiningTable>(ctx.txn(), table_id)?
            .filter(|t| t.is_active && t.location_id == location_id)
            .ok_or(OrderError::TableNotFound(table_id))?;

        if table.effective_status(now) == TableStatus::Occupied {
            return Err(OrderError::TableOccupied(table.number));
        }
        let holders = ctx
            .storage()
            .find_active_orders_for_table_txn(ctx.txn(), table_id, None)?;
        if let Some(holder) = holders.first() {
            return Err(OrderError::TableOccupied(format!(
                "{} (order {})",
                table.number, holder
            )));
        }
        claimed.push(table);
    }

    for table in &mut claimed {
        table.status = TableStatus::Occupied;
        table.reserved_until = None;
        table.reserved_for = None;
        collection::put_in(ctx.txn(), table)?;
    }
    Ok(claimed)
}

/// Release each table that no other non-terminal order references.
///
/// `closing_order_id` is the order reaching a terminal state in this
/// transaction; its own reference does not count. Returns the ids released.
pub fn release_tables_if_unreferenced(
    ctx: &CommandContext<'_>,
    table_ids: &[i64],
    closing_order_id: &str,
) -> Result<Vec<i64>, OrderError> {
    let mut released = Vec::new();
    for &table_id in table_ids {
        let others = ctx.storage().find_active_orders_for_table_txn(
            ctx.txn(),
            table_id,
            Some(closing_order_id),
        )?;
        if !others.is_empty() {
            tracing::debug!(table_id, still_held_by = ?others, "Table stays occupied");
            continue;
        }

        let Some(mut table) = collection::get_in::<DiningTable>(ctx.txn(), table_id)? else {
            tracing::warn!(table_id, order_id = %closing_order_id, "Released table no longer exists");
            continue;
        };
        table.status = TableStatus::Available;
        table.reserved_until = None;
        table.reserved_for = None;
        collection::put_in(ctx.txn(), &table)?;
        released.push(table_id);
    }
    Ok(released)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::orders::storage::OrderStorage;
    use shared::order::{OrderSnapshot, OrderStatus};

    fn table(id: i64, status: TableStatus) -> DiningTable {
        DiningTable {
            id,
            location_id: 10,
            number: format!("T{id}"),
            capacity: 4,
            shape: Default::default(),
            status,
            reserved_until: None,
            reserved_for: None,
            is_active: true,
        }
    }

    fn active_order(storage: &OrderStorage, id: &str, status: OrderStatus, table_ids: Vec<i64>) {
        let mut order = OrderSnapshot::new(id.to_string());
        order.location_id = 10;
        order.status = status;
        order.table_ids = table_ids;
        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &order).unwrap();
        storage.mark_order_active(&txn, id).unwrap();
        txn.commit().unwrap();
    }

    fn setup() -> (DbService, OrderStorage) {
        let db = DbService::open_in_memory().unwrap();
        let storage = OrderStorage::from_database(db.database()).unwrap();
        (db, storage)
    }

    #[test]
    fn test_shared_table_stays_occupied() {
        let (db, storage) = setup();
        db.insert(&table(3, TableStatus::Occupied)).unwrap();
        active_order(&storage, "o-1", OrderStatus::PendingSettlement, vec![3]);
        active_order(&storage, "o-2", OrderStatus::Ongoing, vec![3]);

        let txn = storage.begin_write().unwrap();
        let ctx = CommandContext::new(&txn, &storage, 0);
        let released = release_tables_if_unreferenced(&ctx, &[3], "o-1").unwrap();
        drop(ctx);
        txn.commit().unwrap();

        assert!(released.is_empty());
        let status = db.get::<DiningTable>(3).unwrap().unwrap().status;
        assert_eq!(status, TableStatus::Occupied);
    }

    #[test]
    fn test_last_reference_releases_table() {
        let (db, storage) = setup();
        db.insert(&table(3, TableStatus::Occupied)).unwrap();
        db.insert(&table(4, TableStatus::Occupied)).unwrap();
        active_order(&storage, "o-1", OrderStatus::PendingSettlement, vec![3, 4]);
        active_order(&storage, "o-2", OrderStatus::Ongoing, vec![4]);

        let txn = storage.begin_write().unwrap();
        let ctx = CommandContext::new(&txn, &storage, 0);
        let released = release_tables_if_unreferenced(&ctx, &[3, 4], "o-1").unwrap();
        drop(ctx);
        txn.commit().unwrap();

        assert_eq!(released, vec![3]);
        assert_eq!(
            db.get::<DiningTable>(3).unwrap().unwrap().status,
            TableStatus::Available
        );
        assert_eq!(
            db.get::<DiningTable>(4).unwrap().unwrap().status,
            TableStatus::Occupied
        );
    }

    #[test]
    fn test_claim_refuses_table_held_by_active_order() {
        let (db, storage) = setup();
        // Status drifted to available while o-1 still references the table
        db.insert(&table(3, TableStatus::Available)).unwrap();
        active_order(&storage, "o-1", OrderStatus::Ongoing, vec![3]);

        let txn = storage.begin_write().unwrap();
        let ctx = CommandContext::new(&txn, &storage, 0);
        let result = claim_tables(&ctx, 10, &[3], 0);
        assert!(matches!(result, Err(OrderError::TableOccupied(_))));
    }
}
