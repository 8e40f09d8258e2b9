use super::*;
use crate::db::DbService;
use shared::models::{DiningTable, Location, Role, TableShape, TableStatus};
use shared::order::{
    CommandErrorCode, LineItemInput, OrderCommandPayload, OrderStatus, OrderType, PaymentMethod,
};

mod test_consistency;
mod test_rules;

const LOCATION_ID: i64 = 10;
const OTHER_LOCATION_ID: i64 = 20;
const STAFF_ID: i64 = 7;
const MANAGER_ID: i64 = 2;

/// Manager on an in-memory database with two locations and four tables at
/// the first one (ids 1..=4)
fn create_test_manager() -> (DbService, OrdersManager) {
    let db = DbService::open_in_memory().unwrap();
    for (id, prefix) in [(LOCATION_ID, "BLR1"), (OTHER_LOCATION_ID, "PUN1")] {
        db.insert(&Location {
            id,
            franchise_id: 1,
            name: format!("Outlet {id}"),
            address: None,
            order_prefix: prefix.into(),
            cgst_percent: 2.5,
            sgst_percent: 2.5,
            gstin: None,
            printer_ip: None,
            printer_port: shared::models::DEFAULT_PRINTER_PORT,
            receipt_header: vec![],
            receipt_footer: vec![],
            is_active: true,
            created_at: 0,
            updated_at: 0,
        })
        .unwrap();
    }
    for id in 1..=4 {
        db.insert(&DiningTable {
            id,
            location_id: LOCATION_ID,
            number: format!("T{id}"),
            capacity: 4,
            shape: TableShape::Square,
            status: TableStatus::Available,
            reserved_until: None,
            reserved_for: None,
            is_active: true,
        })
        .unwrap();
    }
    let manager = OrdersManager::new(db.database(), chrono_tz::Asia::Kolkata).unwrap();
    (db, manager)
}

fn staff_cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new(STAFF_ID, "Asha", Role::Staff, payload)
}

fn manager_cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new(MANAGER_ID, "Vikram", Role::Manager, payload)
}

fn item(menu_item_id: i64, name: &str, price: f64, quantity: u32) -> LineItemInput {
    LineItemInput {
        menu_item_id: Some(menu_item_id),
        name: name.to_string(),
        unit_price: price,
        quantity,
        modifications: vec![],
        notes: None,
    }
}

fn tea(quantity: u32) -> LineItemInput {
    item(1, "Tea", 20.0, quantity)
}

/// Create a confirmed dine-in order as staff, returning its id
fn create_dine_in(
    manager: &OrdersManager,
    table_ids: Vec<i64>,
    items: Vec<LineItemInput>,
) -> String {
    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::CreateOrder {
        location_id: LOCATION_ID,
        order_type: OrderType::DineIn,
        table_ids,
        items,
        customer: None,
        confirm: true,
    }));
    assert!(resp.success, "create failed: {:?}", resp.error);
    resp.order_id.unwrap()
}

fn transfer(manager: &OrdersManager, order_id: &str) -> CommandResponse {
    manager.execute_command(staff_cmd(OrderCommandPayload::TransferOrder {
        order_id: order_id.to_string(),
    }))
}

fn accept(manager: &OrdersManager, order_id: &str) -> CommandResponse {
    manager.execute_command(manager_cmd(OrderCommandPayload::AcceptOrder {
        order_id: order_id.to_string(),
    }))
}

fn settle_cmd(order_id: &str, tendered: f64) -> OrderCommand {
    manager_cmd(OrderCommandPayload::SettleOrder {
        order_id: order_id.to_string(),
        method: PaymentMethod::Cash,
        tendered,
    })
}

fn cancel_cmd(order_id: &str) -> OrderCommand {
    staff_cmd(OrderCommandPayload::CancelOrder {
        order_id: order_id.to_string(),
        reason: None,
    })
}

/// Create, transfer and accept: the order ends in `pending_settlement`
fn ready_to_settle(manager: &OrdersManager, table_ids: Vec<i64>) -> String {
    let order_id = create_dine_in(manager, table_ids, vec![tea(2)]);
    assert!(transfer(manager, &order_id).success);
    assert!(accept(manager, &order_id).success);
    order_id
}

fn snapshot(manager: &OrdersManager, order_id: &str) -> OrderSnapshot {
    manager.get_snapshot(order_id).unwrap().unwrap()
}

fn table_status(db: &DbService, table_id: i64) -> TableStatus {
    db.get::<DiningTable>(table_id).unwrap().unwrap().status
}

fn error_code(resp: &CommandResponse) -> CommandErrorCode {
    assert!(!resp.success, "expected failure, got {resp:?}");
    resp.error.as_ref().unwrap().code
}
