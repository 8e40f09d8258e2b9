//! CSV export of closed orders

use shared::models::DiningTable;
use shared::order::{OrderSnapshot, OrderStatus};
use chrono_tz::Tz;
use thiserror::Error;

use crate::utils::time::format_local;

pub const CSV_HEADER: [&str; 12] = [
    "order_number",
    "settled_at",
    "order_type",
    "tables",
    "items",
    "subtotal",
    "discount",
    "cgst",
    "sgst",
    "total",
    "payment_method",
    "staff_id",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV flush failed: {0}")]
    Flush(String),
}

impl From<ReportError> for shared::error::AppError {
    fn from(err: ReportError) -> Self {
        shared::error::AppError::internal(err.to_string())
    }
}

/// One row per settled order.
///
/// `tables` holds display numbers joined by `|`; `items` holds
/// `name x qty` entries joined by `; `.
pub fn orders_csv(orders: &[OrderSnapshot], tables: &[DiningTable], tz: Tz) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(CSV_HEADER)?;

    for order in orders.iter().filter(|o| o.status == OrderStatus::Settled) {
        let table_numbers: Vec<String> = order
            .table_ids
            .iter()
            .map(|id| {
                tables
                    .iter()
                    .find(|t| t.id == *id)
                    .map(|t| t.number.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        let items: Vec<String> = order
            .items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.quantity))
            .collect();

        writer.write_record([
            order.order_number.clone(),
            order.settled_at.map(|at| format_local(at, tz)).unwrap_or_default(),
            order.order_type.to_string(),
            table_numbers.join("|"),
            items.join("; "),
            format!("{:.2}", order.subtotal),
            format!("{:.2}", order.discount),
            format!("{:.2}", order.cgst),
            format!("{:.2}", order.sgst),
            format!("{:.2}", order.total),
            order
                .payment
                .as_ref()
                .map(|p| p.method.to_string())
                .unwrap_or_default(),
            order.staff_id.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Flush(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::summary::tests::{NOON, cancelled, settled};
    use shared::order::PaymentMethod;

    fn table(id: i64, number: &str) -> DiningTable {
        DiningTable {
            id,
            location_id: 10,
            number: number.into(),
            capacity: 4,
            shape: Default::default(),
            status: Default::default(),
            reserved_until: None,
            reserved_for: None,
            is_active: true,
        }
    }

    #[test]
    fn test_csv_columns_and_rows() {
        let orders = vec![
            settled("a", 10, NOON, PaymentMethod::Card, &[("Tea", 20.0, 2), ("Vada, plain", 40.0, 1)]),
            cancelled("c", 10, NOON),
        ];
        let bytes = orders_csv(&orders, &[table(1, "T1")], chrono_tz::Asia::Kolkata).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "order_number,settled_at,order_type,tables,items,subtotal,discount,cgst,sgst,total,payment_method,staff_id"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("PUN-a,2026-03-10 12:00,dine_in,T1,"));
        // embedded comma is quoted
        assert!(row.contains("\"Tea x2; Vada, plain x1\""));
        assert!(row.ends_with(",80.00,0.00,2.00,2.00,84.00,card,7"));
        assert!(lines.next().is_none());
    }
}
