//! Cross-record consistency check and repair
//!
//! Order transitions commit atomically, so in normal operation the scan finds
//! nothing. It exists for data imported from older deployments and for
//! manual edits of the database file.

use redb::WriteTransaction;
use serde::Serialize;
use shared::models::{DiningTable, TableStatus};
use shared::order::{OrderSnapshot, PendingRecord};

use super::storage::{OrderStorage, StorageError};
use crate::db::{RepoError, collection};

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<ReconcileError> for shared::error::AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Repo(e) => e.into(),
            ReconcileError::Storage(e) => shared::error::AppError::database(e.to_string()),
        }
    }
}

impl From<redb::CommitError> for ReconcileError {
    fn from(err: redb::CommitError) -> Self {
        ReconcileError::Storage(err.into())
    }
}

/// One inconsistency
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Order is transferred/pending settlement but has no pending record
    MissingPendingRecord { order_id: String, order_number: String },
    /// Pending record whose order is missing or in another state
    OrphanPendingRecord { order_id: String },
    /// Table marked occupied but no open order uses it
    StuckTable { table_id: i64, number: String },
    /// Table used by an open order but not marked occupied
    UnoccupiedTable {
        table_id: i64,
        number: String,
        order_id: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub issues: Vec<Issue>,
    /// `true` when the issues were fixed and committed
    pub repaired: bool,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    storage: OrderStorage,
}

impl Reconciler {
    pub fn new(storage: OrderStorage) -> Self {
        Self { storage }
    }

    /// Report inconsistencies without changing anything
    pub fn scan(&self) -> Result<ReconcileReport, ReconcileError> {
        let txn = self.storage.begin_write()?;
        let issues = self.find_issues(&txn)?;
        txn.abort().map_err(StorageError::from)?;
        Ok(ReconcileReport {
            issues,
            repaired: false,
        })
    }

    /// Fix every inconsistency in one transaction
    pub fn repair(&self) -> Result<ReconcileReport, ReconcileError> {
        let txn = self.storage.begin_write()?;
        let issues = self.find_issues(&txn)?;
        if issues.is_empty() {
            return Ok(ReconcileReport::default());
        }

        for issue in &issues {
            match issue {
                Issue::MissingPendingRecord { order_id, .. } => {
                    if let Some(order) = self.storage.get_snapshot_txn(&txn, order_id)? {
                        let at = order.transferred_at.unwrap_or(order.updated_at);
                        let mut record =
                            PendingRecord::from_snapshot(&order, order.staff_id, order.staff_name.clone(), at);
                        record.accepted_by = order.accepted_by;
                        record.accepted_at = order.accepted_at;
                        self.storage.store_pending_record(&txn, &record)?;
                    }
                }
                Issue::OrphanPendingRecord { order_id } => {
                    self.storage.remove_pending_record(&txn, order_id)?;
                }
                Issue::StuckTable { table_id, .. } => {
                    set_table_status(&txn, *table_id, TableStatus::Available)?;
                }
                Issue::UnoccupiedTable { table_id, .. } => {
                    set_table_status(&txn, *table_id, TableStatus::Occupied)?;
                }
            }
            tracing::warn!(issue = ?issue, "Repaired inconsistency");
        }

        txn.commit()?;
        Ok(ReconcileReport {
            issues,
            repaired: true,
        })
    }

    fn find_issues(&self, txn: &WriteTransaction) -> Result<Vec<Issue>, ReconcileError> {
        let orders = self.storage.get_all_snapshots_txn(txn)?;
        let pending = self.storage.get_pending_records_txn(txn)?;
        let tables: Vec<DiningTable> = collection::list_in(txn)?;
        let open: Vec<&OrderSnapshot> = orders.iter().filter(|o| !o.is_terminal()).collect();

        let mut issues = Vec::new();

        for order in &orders {
            if order.status.requires_pending_record()
                && !pending.iter().any(|p| p.order_id == order.order_id)
            {
                issues.push(Issue::MissingPendingRecord {
                    order_id: order.order_id.clone(),
                    order_number: order.order_number.clone(),
                });
            }
        }

        for record in &pending {
            let valid = orders
                .iter()
                .any(|o| o.order_id == record.order_id && o.status.requires_pending_record());
            if !valid {
                issues.push(Issue::OrphanPendingRecord {
                    order_id: record.order_id.clone(),
                });
            }
        }

        for table in &tables {
            let holder = open.iter().find(|o| o.table_ids.contains(&table.id));
            match (holder, table.status) {
                (None, TableStatus::Occupied) => issues.push(Issue::StuckTable {
                    table_id: table.id,
                    number: table.number.clone(),
                }),
                (Some(order), status) if status != TableStatus::Occupied => {
                    issues.push(Issue::UnoccupiedTable {
                        table_id: table.id,
                        number: table.number.clone(),
                        order_id: order.order_id.clone(),
                    })
                }
                _ => {}
            }
        }

        Ok(issues)
    }
}

fn set_table_status(
    txn: &WriteTransaction,
    table_id: i64,
    status: TableStatus,
) -> Result<(), ReconcileError> {
    if let Some(mut table) = collection::get_in::<DiningTable>(txn, table_id)? {
        table.status = status;
        table.reserved_until = None;
        table.reserved_for = None;
        collection::put_in(txn, &table)?;
    }
    Ok(())
}
