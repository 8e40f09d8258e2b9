//! Manager-pending record
//!
//! Denormalised copy of a transferred order that a manager works from. It
//! exists exactly while the order is `Transferred` or `PendingSettlement`,
//! keyed by the order id.

use super::snapshot::OrderSnapshot;
use super::types::LineItem;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// Same as the source order id
    pub order_id: String,
    pub order_number: String,
    pub location_id: i64,
    pub table_ids: Vec<i64>,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub discount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total: f64,
    pub transferred_at: i64,
    pub transferred_by: i64,
    pub transferred_by_name: String,
    #[serde(default)]
    pub accepted_by: Option<i64>,
    #[serde(default)]
    pub accepted_by_name: Option<String>,
    #[serde(default)]
    pub accepted_at: Option<i64>,
}

impl PendingRecord {
    /// Build from an order at the moment it is handed over
    pub fn from_snapshot(
        snapshot: &OrderSnapshot,
        transferred_by: i64,
        transferred_by_name: impl Into<String>,
        transferred_at: i64,
    ) -> Self {
        Self {
            order_id: snapshot.order_id.clone(),
            order_number: snapshot.order_number.clone(),
            location_id: snapshot.location_id,
            table_ids: snapshot.table_ids.clone(),
            items: snapshot.items.clone(),
            subtotal: snapshot.subtotal,
            discount: snapshot.discount,
            cgst: snapshot.cgst,
            sgst: snapshot.sgst,
            total: snapshot.total,
            transferred_at,
            transferred_by,
            transferred_by_name: transferred_by_name.into(),
            accepted_by: None,
            accepted_by_name: None,
            accepted_at: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_by.is_some()
    }
}
