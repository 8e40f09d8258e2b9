//! Order snapshot - computed state from the event stream
//!
//! The snapshot carries a `state_checksum` for drift detection: clients that
//! fold the same events must arrive at the same checksum.

use super::types::{AppliedCoupon, CustomerInfo, LineItem, OrderType, PaymentRecord, TaxRates};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Order status
///
/// ```text
/// Temporary ─▶ Ongoing ─▶ Transferred ─▶ PendingSettlement ─▶ Settled
///     │           │  ▲         │                 │
///     │           │  └─────────┘ (returned)      │
///     └───────────┴──────┬─────┴─────────────────┘
///                        ▼
///                    Cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Temporary,
    Ongoing,
    Transferred,
    PendingSettlement,
    Settled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Settled | OrderStatus::Cancelled)
    }

    /// Every non-terminal order holds its tables
    pub fn holds_tables(&self) -> bool {
        !self.is_terminal()
    }

    /// Items can still be changed by staff
    pub fn is_editable(&self) -> bool {
        matches!(self, OrderStatus::Temporary | OrderStatus::Ongoing)
    }

    /// A manager-pending record must exist in exactly these states
    pub fn requires_pending_record(&self) -> bool {
        matches!(
            self,
            OrderStatus::Transferred | OrderStatus::PendingSettlement
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Temporary => "temporary",
            OrderStatus::Ongoing => "ongoing",
            OrderStatus::Transferred => "transferred",
            OrderStatus::PendingSettlement => "pending_settlement",
            OrderStatus::Settled => "settled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order snapshot - computed from the event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    pub order_id: String,
    /// `{PREFIX}-{YYYYMMDD}-{NNNN}`
    pub order_number: String,
    pub location_id: i64,
    pub order_type: OrderType,
    /// Empty for delivery
    pub table_ids: Vec<i64>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub customer: Option<CustomerInfo>,
    pub status: OrderStatus,
    pub tax: TaxRates,
    #[serde(default)]
    pub coupon: Option<AppliedCoupon>,

    // === Totals (2 dp) ===
    pub subtotal: f64,
    pub discount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total: f64,

    /// Staff who created the order
    pub staff_id: i64,
    pub staff_name: String,
    #[serde(default)]
    pub accepted_by: Option<i64>,
    #[serde(default)]
    pub payment: Option<PaymentRecord>,
    #[serde(default)]
    pub cancel_reason: Option<String>,

    // === Timestamps (Unix millis) ===
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub transferred_at: Option<i64>,
    #[serde(default)]
    pub accepted_at: Option<i64>,
    #[serde(default)]
    pub settled_at: Option<i64>,
    #[serde(default)]
    pub cancelled_at: Option<i64>,

    /// Sequence of the last applied event
    pub last_sequence: u64,
    #[serde(default)]
    pub state_checksum: String,
}

impl OrderSnapshot {
    pub fn new(order_id: String) -> Self {
        Self {
            order_id,
            order_number: String::new(),
            location_id: 0,
            order_type: OrderType::DineIn,
            table_ids: Vec::new(),
            items: Vec::new(),
            customer: None,
            status: OrderStatus::Temporary,
            tax: TaxRates::default(),
            coupon: None,
            subtotal: 0.0,
            discount: 0.0,
            cgst: 0.0,
            sgst: 0.0,
            total: 0.0,
            staff_id: 0,
            staff_name: String::new(),
            accepted_by: None,
            payment: None,
            cancel_reason: None,
            created_at: 0,
            updated_at: 0,
            transferred_at: None,
            accepted_at: None,
            settled_at: None,
            cancelled_at: None,
            last_sequence: 0,
            state_checksum: String::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn find_item(&self, instance_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.instance_id == instance_id)
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Compute state checksum for drift detection (16 hex chars)
    ///
    /// Covers item count, total in paise, last sequence and status.
    pub fn compute_checksum(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher as _;

        let mut hasher = DefaultHasher::new();
        self.items.len().hash(&mut hasher);
        ((self.total * 100.0).round() as i64).hash(&mut hasher);
        self.last_sequence.hash(&mut hasher);
        self.status.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    pub fn update_checksum(&mut self) {
        self.state_checksum = self.compute_checksum();
    }

    pub fn verify_checksum(&self) -> bool {
        self.state_checksum == self.compute_checksum()
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Settled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Temporary.holds_tables());
        assert!(OrderStatus::PendingSettlement.holds_tables());
    }

    #[test]
    fn test_pending_record_states() {
        assert!(OrderStatus::Transferred.requires_pending_record());
        assert!(OrderStatus::PendingSettlement.requires_pending_record());
        assert!(!OrderStatus::Ongoing.requires_pending_record());
        assert!(!OrderStatus::Settled.requires_pending_record());
    }

    #[test]
    fn test_checksum_tracks_state() {
        let mut snapshot = OrderSnapshot::new("o-1".into());
        snapshot.update_checksum();
        assert!(snapshot.verify_checksum());

        snapshot.total = 42.0;
        assert!(!snapshot.verify_checksum());
        snapshot.update_checksum();
        assert!(snapshot.verify_checksum());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&OrderStatus::PendingSettlement).unwrap();
        assert_eq!(json, "\"pending_settlement\"");
    }
}
