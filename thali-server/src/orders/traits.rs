//! Core traits of the order engine
//!
//! - [`CommandHandler`]: turns a command into events, validating against the
//!   current snapshot and staging side effects in the open transaction
//! - [`EventApplier`]: folds one event into a snapshot (pure)
//! - [`CommandContext`]: the open write transaction plus a snapshot cache

use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::models::Role;
use shared::order::{CommandErrorCode, OrderEvent, OrderSnapshot, OrderStatus, PendingRecord};
use std::collections::HashMap;
use thiserror::Error;

use super::storage::{OrderStorage, StorageError};
use crate::db::RepoError;

/// Action-level errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already settled: {0}")]
    OrderAlreadySettled(String),

    #[error("Order already cancelled: {0}")]
    OrderAlreadyCancelled(String),

    #[error("Cannot {action} an order in status {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: &'static str,
    },

    #[error("Order has no items: {0}")]
    OrderEmpty(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Tendered {tendered:.2} is less than total {total:.2}")]
    InsufficientPayment { total: f64, tendered: f64 },

    #[error("Location not found: {0}")]
    LocationNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Table is already occupied: {0}")]
    TableOccupied(String),

    #[error("A pending record already exists for order {0}")]
    PendingRecordExists(String),

    #[error("No pending record for order {0}")]
    PendingRecordNotFound(String),

    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Coupon is inactive: {0}")]
    CouponInactive(String),

    #[error("Coupon {0} matches no item in this order")]
    CouponNotApplicable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Order belongs to another location: {0}")]
    OutsideTenantScope(String),

    #[error("{1}")]
    InvalidOperation(CommandErrorCode, String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OrderError {
    pub fn code(&self) -> CommandErrorCode {
        match self {
            OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            OrderError::OrderAlreadySettled(_) => CommandErrorCode::OrderAlreadySettled,
            OrderError::OrderAlreadyCancelled(_) => CommandErrorCode::OrderAlreadyCancelled,
            OrderError::InvalidTransition { .. } => CommandErrorCode::InvalidTransition,
            OrderError::OrderEmpty(_) => CommandErrorCode::OrderEmpty,
            OrderError::ItemNotFound(_) => CommandErrorCode::ItemNotFound,
            OrderError::InvalidQuantity(_) => CommandErrorCode::InvalidQuantity,
            OrderError::InvalidAmount(_) => CommandErrorCode::InvalidAmount,
            OrderError::InsufficientPayment { .. } => CommandErrorCode::InsufficientPayment,
            OrderError::LocationNotFound(_) => CommandErrorCode::LocationNotFound,
            OrderError::TableNotFound(_) => CommandErrorCode::TableNotFound,
            OrderError::TableOccupied(_) => CommandErrorCode::TableOccupied,
            OrderError::PendingRecordExists(_) => CommandErrorCode::PendingRecordExists,
            OrderError::PendingRecordNotFound(_) => CommandErrorCode::PendingRecordNotFound,
            OrderError::CouponNotFound(_) => CommandErrorCode::CouponNotFound,
            OrderError::CouponInactive(_) => CommandErrorCode::CouponInactive,
            OrderError::CouponNotApplicable(_) => CommandErrorCode::CouponNotApplicable,
            OrderError::PermissionDenied(_) => CommandErrorCode::PermissionDenied,
            OrderError::OutsideTenantScope(_) => CommandErrorCode::OutsideTenantScope,
            OrderError::InvalidOperation(code, _) => *code,
            OrderError::Storage(_) => CommandErrorCode::InternalError,
        }
    }

    /// Terminal orders report their terminal state rather than a generic
    /// transition error
    pub fn for_status(order_id: &str, from: OrderStatus, action: &'static str) -> Self {
        match from {
            OrderStatus::Settled => OrderError::OrderAlreadySettled(order_id.to_string()),
            OrderStatus::Cancelled => OrderError::OrderAlreadyCancelled(order_id.to_string()),
            _ => OrderError::InvalidTransition { from, action },
        }
    }
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        OrderError::Storage(err.to_string())
    }
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        OrderError::Storage(err.to_string())
    }
}

/// Who issued the command, filled from the authenticated session
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    pub role: Role,
    /// Client timestamp (Unix millis)
    pub timestamp: i64,
}

/// Produces events for one command
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Applies one event to a snapshot. Implementations must be pure.
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}

/// Command execution context
///
/// Wraps the open write transaction. Snapshots touched by the command are
/// cached here until the manager persists them; pending-record, table and
/// counter writes go straight into the transaction and are discarded with it
/// if the command fails.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    sequence: u64,
    snapshots: HashMap<String, OrderSnapshot>,
}

impl<'a> CommandContext<'a> {
    /// `current_sequence` is the last sequence already used
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            sequence: current_sequence,
            snapshots: HashMap::new(),
        }
    }

    pub fn txn(&self) -> &'a WriteTransaction {
        self.txn
    }

    pub fn storage(&self) -> &'a OrderStorage {
        self.storage
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Load a snapshot, preferring the copy modified by this command
    pub fn load_snapshot(&self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.snapshots.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Fresh snapshot for a new order
    pub fn create_snapshot(&self, order_id: String) -> OrderSnapshot {
        OrderSnapshot::new(order_id)
    }

    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        self.snapshots.insert(snapshot.order_id.clone(), snapshot);
    }

    pub fn modified_snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.snapshots.values()
    }

    // ========== Pending records ==========

    pub fn pending_record(&self, order_id: &str) -> Result<Option<PendingRecord>, OrderError> {
        Ok(self.storage.get_pending_record_txn(self.txn, order_id)?)
    }

    pub fn put_pending_record(&self, record: &PendingRecord) -> Result<(), OrderError> {
        Ok(self.storage.store_pending_record(self.txn, record)?)
    }

    pub fn remove_pending_record(&self, order_id: &str) -> Result<bool, OrderError> {
        Ok(self.storage.remove_pending_record(self.txn, order_id)?)
    }

    pub fn next_order_number(&self, location_id: i64, business_date: u32) -> Result<u64, OrderError> {
        Ok(self
            .storage
            .next_order_number(self.txn, location_id, business_date)?)
    }
}
