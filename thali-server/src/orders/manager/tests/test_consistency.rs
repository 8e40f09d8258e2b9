use super::*;

/// Cross-record invariants that must hold after every committed command
fn assert_consistent(db: &DbService, manager: &OrdersManager) {
    let orders = manager.get_all_orders().unwrap();
    let pending = manager.get_pending_records().unwrap();

    for order in &orders {
        let has_pending = pending.iter().any(|p| p.order_id == order.order_id);
        assert_eq!(
            has_pending,
            order.status.requires_pending_record(),
            "order {} in {} has_pending={}",
            order.order_number,
            order.status,
            has_pending
        );
        assert!(order.verify_checksum());
    }

    for table in db.list::<DiningTable>().unwrap() {
        let referenced = orders
            .iter()
            .any(|o| !o.is_terminal() && o.table_ids.contains(&table.id));
        assert_eq!(
            referenced,
            table.status == TableStatus::Occupied,
            "table {} status {:?}",
            table.number,
            table.status
        );
    }
}

#[test]
fn test_invariants_hold_through_mixed_flows() {
    let (db, manager) = create_test_manager();

    let a = create_dine_in(&manager, vec![1, 2], vec![tea(2)]);
    assert_consistent(&db, &manager);
    let b = create_dine_in(&manager, vec![3], vec![tea(1)]);
    assert_consistent(&db, &manager);

    assert!(transfer(&manager, &a).success);
    assert_consistent(&db, &manager);
    assert!(transfer(&manager, &b).success);
    assert!(accept(&manager, &b).success);
    assert_consistent(&db, &manager);

    // Rejected commands leave everything as it was
    assert!(!manager.execute_command(settle_cmd(&b, 1.0)).success);
    assert!(!transfer(&manager, &a).success);
    assert_consistent(&db, &manager);

    assert!(manager.execute_command(settle_cmd(&b, 100.0)).success);
    assert_consistent(&db, &manager);
    assert!(
        manager
            .execute_command(manager_cmd(OrderCommandPayload::CancelOrder {
                order_id: a.clone(),
                reason: None,
            }))
            .success
    );
    assert_consistent(&db, &manager);

    for id in 1..=4 {
        assert_eq!(table_status(&db, id), TableStatus::Available);
    }
}

#[test]
fn test_rebuild_matches_stored_snapshot() {
    let (_db, manager) = create_test_manager();
    let order_id = create_dine_in(&manager, vec![1], vec![tea(2), item(2, "Vada", 45.0, 1)]);
    let vada = snapshot(&manager, &order_id)
        .items
        .into_iter()
        .find(|i| i.name == "Vada")
        .unwrap();
    assert!(
        manager
            .execute_command(staff_cmd(OrderCommandPayload::ModifyItemQuantity {
                order_id: order_id.clone(),
                instance_id: vada.instance_id,
                quantity: 3,
            }))
            .success
    );
    assert!(transfer(&manager, &order_id).success);
    assert!(accept(&manager, &order_id).success);
    assert!(manager.execute_command(settle_cmd(&order_id, 200.0)).success);

    let stored = snapshot(&manager, &order_id);
    let rebuilt = manager.rebuild_snapshot(&order_id).unwrap();
    assert_eq!(rebuilt, stored);
    assert_eq!(rebuilt.state_checksum, stored.state_checksum);
}

#[test]
fn test_order_numbers_are_sequential_per_location() {
    let (_db, manager) = create_test_manager();
    let first = create_dine_in(&manager, vec![1], vec![]);
    let second = create_dine_in(&manager, vec![2], vec![]);
    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::CreateOrder {
        location_id: OTHER_LOCATION_ID,
        order_type: OrderType::Delivery,
        table_ids: vec![],
        items: vec![],
        customer: None,
        confirm: true,
    }));
    let elsewhere = resp.order_id.unwrap();

    let first = snapshot(&manager, &first).order_number;
    let second = snapshot(&manager, &second).order_number;
    let elsewhere = snapshot(&manager, &elsewhere).order_number;
    assert!(first.ends_with("-0001"));
    assert!(second.ends_with("-0002"));
    assert!(elsewhere.starts_with("PUN1-"));
    assert!(elsewhere.ends_with("-0001"));
    assert_eq!(first[..14], second[..14]);
}

#[test]
fn test_concurrent_creates_get_distinct_numbers() {
    let (_db, manager) = create_test_manager();
    let order_ids: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let resp =
                        manager.execute_command(staff_cmd(OrderCommandPayload::CreateOrder {
                            location_id: LOCATION_ID,
                            order_type: OrderType::Delivery,
                            table_ids: vec![],
                            items: vec![tea(1)],
                            customer: None,
                            confirm: true,
                        }));
                    assert!(resp.success, "create failed: {:?}", resp.error);
                    resp.order_id.unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut numbers: Vec<String> = order_ids
        .iter()
        .map(|id| snapshot(&manager, id).order_number)
        .collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 8);
    let expected: Vec<String> = (1..=8).map(|n| format!("-{n:04}")).collect();
    for (number, suffix) in numbers.iter().zip(&expected) {
        assert!(number.ends_with(suffix.as_str()), "{number} vs {suffix}");
    }
}

#[test]
fn test_settle_keeps_table_held_by_another_order() {
    let (db, manager) = create_test_manager();
    let order_id = ready_to_settle(&manager, vec![3]);

    // Legacy data: a second open order on the same table
    let mut legacy = OrderSnapshot::new("legacy-1".to_string());
    legacy.location_id = LOCATION_ID;
    legacy.status = OrderStatus::Ongoing;
    legacy.table_ids = vec![3];
    legacy.staff_id = STAFF_ID;
    let storage = manager.storage();
    let txn = storage.begin_write().unwrap();
    storage.store_snapshot(&txn, &legacy).unwrap();
    storage.mark_order_active(&txn, "legacy-1").unwrap();
    txn.commit().unwrap();

    assert!(manager.execute_command(settle_cmd(&order_id, 100.0)).success);
    assert_eq!(snapshot(&manager, &order_id).status, OrderStatus::Settled);
    assert_eq!(table_status(&db, 3), TableStatus::Occupied);

    assert!(manager.execute_command(cancel_cmd("legacy-1")).success);
    assert_eq!(table_status(&db, 3), TableStatus::Available);
}

#[test]
fn test_failed_create_does_not_consume_number_or_table() {
    let (db, manager) = create_test_manager();
    // Second table does not exist
    let resp = manager.execute_command(staff_cmd(OrderCommandPayload::CreateOrder {
        location_id: LOCATION_ID,
        order_type: OrderType::DineIn,
        table_ids: vec![1, 42],
        items: vec![],
        customer: None,
        confirm: true,
    }));
    assert_eq!(error_code(&resp), CommandErrorCode::TableNotFound);
    assert_eq!(table_status(&db, 1), TableStatus::Available);

    let order_id = create_dine_in(&manager, vec![1], vec![]);
    assert!(snapshot(&manager, &order_id).order_number.ends_with("-0001"));
    assert_eq!(manager.get_current_sequence().unwrap(), 1);
}

#[tokio::test]
async fn test_events_are_broadcast_after_commit() {
    let (_db, manager) = create_test_manager();
    let mut rx = manager.subscribe();
    let order_id = create_dine_in(&manager, vec![1], vec![tea(1)]);

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.order_id, order_id);
    assert_eq!(first.sequence + 1, second.sequence);
    assert_eq!(
        second.event_type,
        shared::order::OrderEventType::ItemsAdded
    );
}
