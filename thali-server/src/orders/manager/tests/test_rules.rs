use super::*;

// ========================================================================
// Idempotency
// ========================================================================

#[test]
fn test_duplicate_command_has_no_effect() {
    let (_db, manager) = create_test_manager();
    let order_id = ready_to_settle(&manager, vec![1]);

    let cmd = settle_cmd(&order_id, 42.0);
    let first = manager.execute_command(cmd.clone());
    assert!(first.success);
    let sequence = manager.get_current_sequence().unwrap();

    let second = manager.execute_command(cmd);
    assert!(second.success);
    assert!(second.duplicate);
    assert_eq!(manager.get_current_sequence().unwrap(), sequence);
}

#[test]
fn test_settle_twice_with_new_command_fails() {
    let (db, manager) = create_test_manager();
    let order_id = ready_to_settle(&manager, vec![1]);
    assert!(manager.execute_command(settle_cmd(&order_id, 42.0)).success);

    // Another order grabs the freed table
    let other = create_dine_in(&manager, vec![1], vec![tea(1)]);

    let resp = manager.execute_command(settle_cmd(&order_id, 42.0));
    assert_eq!(error_code(&resp), CommandErrorCode::OrderAlreadySettled);

    // Nothing was released or recorded again
    assert_eq!(table_status(&db, 1), TableStatus::Occupied);
    let settled_events = manager
        .get_events_for_order(&order_id)
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == shared::order::OrderEventType::OrderSettled)
        .count();
    assert_eq!(settled_events, 1);
    assert_eq!(snapshot(&manager, &other).status, OrderStatus::Ongoing);
}

#[test]
fn test_failed_command_is_not_marked_processed() {
    let (_db, manager) = create_test_manager();
    let order_id = ready_to_settle(&manager, vec![1]);

    let short = settle_cmd(&order_id, 10.0);
    let resp = manager.execute_command(short.clone());
    assert_eq!(error_code(&resp), CommandErrorCode::InsufficientPayment);

    // Same command id again is evaluated again, not reported as duplicate
    let resp = manager.execute_command(short);
    assert!(!resp.duplicate);
    assert_eq!(error_code(&resp), CommandErrorCode::InsufficientPayment);
    assert_eq!(
        snapshot(&manager, &order_id).status,
        OrderStatus::PendingSettlement
    );
}

// ========================================================================
// Capabilities
// ========================================================================

#[test]
fn test_staff_cannot_accept_or_settle() {
    let (_db, manager) = create_test_manager();
    let order_id = create_dine_in(&manager, vec![1], vec![tea(2)]);
    assert!(transfer(&manager, &order_id).success);

    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::AcceptOrder {
        order_id: order_id.clone(),
    }));
    assert_eq!(error_code(&resp), CommandErrorCode::PermissionDenied);

    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::ReturnToStaff {
        order_id: order_id.clone(),
        reason: None,
    }));
    assert_eq!(error_code(&resp), CommandErrorCode::PermissionDenied);

    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::SettleOrder {
        order_id: order_id.clone(),
        method: PaymentMethod::Card,
        tendered: 42.0,
    }));
    assert_eq!(error_code(&resp), CommandErrorCode::PermissionDenied);
    assert_eq!(snapshot(&manager, &order_id).status, OrderStatus::Transferred);
}

#[test]
fn test_staff_cancel_rules() {
    let (db, manager) = create_test_manager();

    // Own ongoing order: allowed
    let own = create_dine_in(&manager, vec![1], vec![tea(1)]);
    assert!(manager.execute_command(cancel_cmd(&own)).success);
    assert_eq!(table_status(&db, 1), TableStatus::Available);

    // Another staff member's order: denied
    let theirs = create_dine_in(&manager, vec![2], vec![tea(1)]);
    let resp = manager.execute_command(OrderCommand::new(
        99,
        "Ravi",
        Role::Staff,
        OrderCommandPayload::CancelOrder {
            order_id: theirs.clone(),
            reason: None,
        },
    ));
    assert_eq!(error_code(&resp), CommandErrorCode::PermissionDenied);

    // Own order after transfer: denied
    assert!(transfer(&manager, &theirs).success);
    let resp = manager.execute_command(cancel_cmd(&theirs));
    assert_eq!(error_code(&resp), CommandErrorCode::PermissionDenied);
    assert_eq!(table_status(&db, 2), TableStatus::Occupied);
}

// ========================================================================
// Tenant scope
// ========================================================================

#[test]
fn test_scope_blocks_other_locations() {
    let (_db, manager) = create_test_manager();
    let order_id = create_dine_in(&manager, vec![1], vec![tea(1)]);
    let elsewhere = LocationScope::Only(vec![OTHER_LOCATION_ID]);

    let resp = manager.execute_scoped(
        staff_cmd(OrderCommandPayload::AddItems {
            order_id: order_id.clone(),
            items: vec![tea(1)],
        }),
        &elsewhere,
    );
    assert_eq!(error_code(&resp), CommandErrorCode::OutsideTenantScope);

    let resp = manager.execute_scoped(
        staff_cmd(OrderCommandPayload::CreateOrder {
            location_id: LOCATION_ID,
            order_type: OrderType::Delivery,
            table_ids: vec![],
            items: vec![],
            customer: None,
            confirm: true,
        }),
        &elsewhere,
    );
    assert_eq!(error_code(&resp), CommandErrorCode::OutsideTenantScope);

    let home = LocationScope::Only(vec![LOCATION_ID]);
    let resp = manager.execute_scoped(
        staff_cmd(OrderCommandPayload::AddItems {
            order_id,
            items: vec![tea(1)],
        }),
        &home,
    );
    assert!(resp.success);
}

// ========================================================================
// Validation
// ========================================================================

#[test]
fn test_occupied_and_foreign_tables_rejected() {
    let (_db, manager) = create_test_manager();
    create_dine_in(&manager, vec![1], vec![tea(1)]);

    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::CreateOrder {
        location_id: LOCATION_ID,
        order_type: OrderType::DineIn,
        table_ids: vec![2, 1],
        items: vec![],
        customer: None,
        confirm: true,
    }));
    assert_eq!(error_code(&resp), CommandErrorCode::TableOccupied);

    // Tables 1..=4 belong to the first location
    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::CreateOrder {
        location_id: OTHER_LOCATION_ID,
        order_type: OrderType::DineIn,
        table_ids: vec![3],
        items: vec![],
        customer: None,
        confirm: true,
    }));
    assert_eq!(error_code(&resp), CommandErrorCode::TableNotFound);
}

#[test]
fn test_unknown_order() {
    let (_db, manager) = create_test_manager();
    let resp = transfer(&manager, "missing");
    assert_eq!(error_code(&resp), CommandErrorCode::OrderNotFound);
}

#[test]
fn test_transfer_empty_order_rejected() {
    let (_db, manager) = create_test_manager();
    let order_id = create_dine_in(&manager, vec![1], vec![]);
    assert_eq!(
        error_code(&transfer(&manager, &order_id)),
        CommandErrorCode::OrderEmpty
    );
    assert!(manager.get_pending_records().unwrap().is_empty());
}
