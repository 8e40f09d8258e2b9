//! redb-based storage layer for order event sourcing
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Event stream (append-only) |
//! | `snapshots` | `order_id` | `OrderSnapshot` | Snapshot cache |
//! | `active_orders` | `order_id` | `()` | Non-terminal order index |
//! | `pending_records` | `order_id` | `PendingRecord` | Manager-pending copies |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `sequence_counter` | `"seq"` | `u64` | Global sequence |
//! | `order_numbers` | `(location_id, yyyymmdd)` | `u64` | Daily order counter |
//!
//! The tables live in the same database file as the catalog collections, so
//! one `WriteTransaction` covers an order, its pending record and its tables.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::order::{OrderEvent, OrderSnapshot, PendingRecord};
use std::sync::Arc;
use thiserror::Error;

/// key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// key = order_id, value = JSON-serialized OrderSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// key = order_id, value = JSON-serialized PendingRecord
const PENDING_RECORDS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("pending_records");

/// key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

/// key = (location_id, business date as yyyymmdd), value = last issued number
const ORDER_NUMBERS_TABLE: TableDefinition<(i64, u32), u64> =
    TableDefinition::new("order_numbers");

const SEQUENCE_KEY: &str = "seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Attach to an open database and create the order tables if missing
    pub fn from_database(db: Arc<Database>) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PENDING_RECORDS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(ORDER_NUMBERS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::from_database(Arc::new(db))
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Get the next sequence number (does NOT increment - use within transaction)
    pub fn get_next_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        Ok(current + 1)
    }

    /// Current sequence within a transaction
    pub fn get_current_sequence_txn(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let table = txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Get current sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set sequence number (within transaction)
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    // ========== Order Numbers ==========

    /// Increment and return the counter for `(location, business date)`.
    ///
    /// Runs inside the creating transaction, so two creates at one location
    /// can never draw the same number.
    pub fn next_order_number(
        &self,
        txn: &WriteTransaction,
        location_id: i64,
        business_date: u32,
    ) -> StorageResult<u64> {
        let mut table = txn.open_table(ORDER_NUMBERS_TABLE)?;
        let current = table
            .get((location_id, business_date))?
            .map(|g| g.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert((location_id, business_date), next)?;
        Ok(next)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order, in sequence order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    /// Get events since a given sequence (across all orders)
    pub fn get_events_since(&self, since_sequence: u64) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            if event.sequence > since_sequence {
                events.push(event);
            }
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    // ========== Snapshot Operations ==========

    /// Store a snapshot
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &OrderSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Get a snapshot by order ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Get all snapshots
    pub fn get_all_snapshots(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        read_snapshots(&table)
    }

    /// Get all snapshots (within transaction)
    pub fn get_all_snapshots_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<OrderSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;
        read_snapshots(&table)
    }

    // ========== Active Orders ==========

    /// Mark an order as active
    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Mark an order as inactive
    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Get all active order IDs
    pub fn get_active_order_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;

        let mut order_ids: Vec<String> = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            order_ids.push(key.value().to_string());
        }

        Ok(order_ids)
    }

    /// Get all active order snapshots
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        read_active(&active_table, &snapshots_table)
    }

    /// Get all active order snapshots (within transaction)
    pub fn get_active_orders_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<OrderSnapshot>> {
        let active_table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let snapshots_table = txn.open_table(SNAPSHOTS_TABLE)?;
        read_active(&active_table, &snapshots_table)
    }

    /// Active orders that reference `table_id`, other than `exclude_order_id`
    pub fn find_active_orders_for_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
        exclude_order_id: Option<&str>,
    ) -> StorageResult<Vec<String>> {
        Ok(self
            .get_active_orders_txn(txn)?
            .into_iter()
            .filter(|s| Some(s.order_id.as_str()) != exclude_order_id)
            .filter(|s| s.table_ids.contains(&table_id))
            .map(|s| s.order_id)
            .collect())
    }

    // ========== Pending Records ==========

    pub fn store_pending_record(
        &self,
        txn: &WriteTransaction,
        record: &PendingRecord,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_RECORDS_TABLE)?;
        let value = serde_json::to_vec(record)?;
        table.insert(record.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_pending_record(&self, order_id: &str) -> StorageResult<Option<PendingRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_RECORDS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_pending_record_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<PendingRecord>> {
        let table = txn.open_table(PENDING_RECORDS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Delete a pending record; returns whether one existed
    pub fn remove_pending_record(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(PENDING_RECORDS_TABLE)?;
        let removed = table.remove(order_id)?.is_some();
        Ok(removed)
    }

    pub fn get_pending_records(&self) -> StorageResult<Vec<PendingRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_RECORDS_TABLE)?;
        read_pending(&table)
    }

    pub fn get_pending_records_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<PendingRecord>> {
        let table = txn.open_table(PENDING_RECORDS_TABLE)?;
        read_pending(&table)
    }

    // ========== Statistics ==========

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let events_table = read_txn.open_table(EVENTS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let pending_table = read_txn.open_table(PENDING_RECORDS_TABLE)?;
        let commands_table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        let seq_table = read_txn.open_table(SEQUENCE_TABLE)?;

        Ok(StorageStats {
            event_count: events_table.len()?,
            snapshot_count: snapshots_table.len()?,
            active_order_count: active_table.len()?,
            pending_record_count: pending_table.len()?,
            processed_command_count: commands_table.len()?,
            current_sequence: seq_table
                .get(SEQUENCE_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
        })
    }
}

fn read_snapshots(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> StorageResult<Vec<OrderSnapshot>> {
    let mut snapshots = Vec::new();
    for result in table.iter()? {
        let (_key, value) = result?;
        snapshots.push(serde_json::from_slice(value.value())?);
    }
    Ok(snapshots)
}

fn read_active(
    active_table: &impl ReadableTable<&'static str, ()>,
    snapshots_table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> StorageResult<Vec<OrderSnapshot>> {
    let mut snapshots = Vec::new();
    for result in active_table.iter()? {
        let (key, _) = result?;
        if let Some(value) = snapshots_table.get(key.value())? {
            snapshots.push(serde_json::from_slice(value.value())?);
        }
    }
    Ok(snapshots)
}

fn read_pending(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> StorageResult<Vec<PendingRecord>> {
    let mut records = Vec::new();
    for result in table.iter()? {
        let (_key, value) = result?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageStats {
    pub event_count: u64,
    pub snapshot_count: u64,
    pub active_order_count: u64,
    pub pending_record_count: u64,
    pub processed_command_count: u64,
    pub current_sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{EventPayload, OrderStatus};

    fn create_test_event(order_id: &str, sequence: u64) -> OrderEvent {
        OrderEvent::new(
            sequence,
            order_id.to_string(),
            1,
            "Test Operator".to_string(),
            uuid::Uuid::new_v4().to_string(),
            None,
            EventPayload::OrderConfirmed,
        )
    }

    fn create_test_snapshot(order_id: &str, table_ids: Vec<i64>) -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        snapshot.status = OrderStatus::Ongoing;
        snapshot.table_ids = table_ids;
        snapshot.update_checksum();
        snapshot
    }

    #[test]
    fn test_sequence_starts_at_zero() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_current_sequence().unwrap(), 0);

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.get_next_sequence(&txn).unwrap(), 1);
        storage.set_sequence(&txn, 7).unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.get_current_sequence().unwrap(), 7);
    }

    #[test]
    fn test_store_and_get_events() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.store_event(&txn, &create_test_event("o-1", 2)).unwrap();
        storage.store_event(&txn, &create_test_event("o-1", 1)).unwrap();
        storage.store_event(&txn, &create_test_event("o-2", 3)).unwrap();
        txn.commit().unwrap();

        let events = storage.get_events_for_order("o-1").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);

        let since = storage.get_events_since(1).unwrap();
        assert_eq!(
            since.iter().map(|e| e.sequence).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn test_command_idempotency_marker() {
        let storage = OrderStorage::open_in_memory().unwrap();
        assert!(!storage.is_command_processed("cmd-1").unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_command_processed(&txn, "cmd-1").unwrap();
        assert!(storage.is_command_processed_txn(&txn, "cmd-1").unwrap());
        txn.commit().unwrap();

        assert!(storage.is_command_processed("cmd-1").unwrap());
    }

    #[test]
    fn test_order_numbers_are_per_location_and_day() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_order_number(&txn, 1, 20250114).unwrap(), 1);
        assert_eq!(storage.next_order_number(&txn, 1, 20250114).unwrap(), 2);
        assert_eq!(storage.next_order_number(&txn, 2, 20250114).unwrap(), 1);
        assert_eq!(storage.next_order_number(&txn, 1, 20250115).unwrap(), 1);
        txn.commit().unwrap();
    }

    #[test]
    fn test_active_index_and_table_lookup() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &create_test_snapshot("o-1", vec![10, 11]))
            .unwrap();
        storage
            .store_snapshot(&txn, &create_test_snapshot("o-2", vec![11]))
            .unwrap();
        storage.mark_order_active(&txn, "o-1").unwrap();
        storage.mark_order_active(&txn, "o-2").unwrap();

        let refs = storage
            .find_active_orders_for_table_txn(&txn, 11, Some("o-1"))
            .unwrap();
        assert_eq!(refs, vec!["o-2".to_string()]);

        storage.mark_order_inactive(&txn, "o-2").unwrap();
        let refs = storage
            .find_active_orders_for_table_txn(&txn, 11, Some("o-1"))
            .unwrap();
        assert!(refs.is_empty());
        txn.commit().unwrap();

        assert_eq!(storage.get_active_order_ids().unwrap(), vec!["o-1".to_string()]);
        assert_eq!(storage.get_all_snapshots().unwrap().len(), 2);
    }

    #[test]
    fn test_pending_record_roundtrip() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let snapshot = create_test_snapshot("o-1", vec![1]);
        let record = PendingRecord::from_snapshot(&snapshot, 5, "Asha", 1_000);

        let txn = storage.begin_write().unwrap();
        storage.store_pending_record(&txn, &record).unwrap();
        txn.commit().unwrap();
        assert_eq!(storage.get_pending_record("o-1").unwrap(), Some(record));

        let txn = storage.begin_write().unwrap();
        assert!(storage.remove_pending_record(&txn, "o-1").unwrap());
        assert!(!storage.remove_pending_record(&txn, "o-1").unwrap());
        txn.commit().unwrap();
        assert!(storage.get_pending_records().unwrap().is_empty());
    }

    #[test]
    fn test_dropped_transaction_writes_nothing() {
        let storage = OrderStorage::open_in_memory().unwrap();
        {
            let txn = storage.begin_write().unwrap();
            storage
                .store_snapshot(&txn, &create_test_snapshot("o-1", vec![]))
                .unwrap();
            // dropped without commit
        }
        assert!(storage.get_snapshot("o-1").unwrap().is_none());
    }
}
