//! Sales summary aggregation

use std::collections::{BTreeMap, HashMap};

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::order::{OrderSnapshot, OrderStatus};

use crate::auth::LocationScope;
use crate::orders::money::{to_decimal, to_f64};
use crate::utils::time::business_date;

/// How many items [`SalesReport::top_items`] lists
const TOP_ITEMS: usize = 10;

/// Which orders a report covers
#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub scope: LocationScope,
    /// Inclusive start, Unix millis
    pub start: i64,
    /// Exclusive end, Unix millis
    pub end: i64,
}

impl ReportFilter {
    /// Closing time of a settled or cancelled order
    fn closed_at(order: &OrderSnapshot) -> Option<i64> {
        match order.status {
            OrderStatus::Settled => order.settled_at,
            OrderStatus::Cancelled => order.cancelled_at,
            _ => None,
        }
    }

    pub fn matches(&self, order: &OrderSnapshot) -> bool {
        self.scope.allows(order.location_id)
            && Self::closed_at(order).is_some_and(|at| at >= self.start && at < self.end)
    }
}

/// Settled and cancelled orders in the filter, oldest first
pub fn closed_orders(orders: Vec<OrderSnapshot>, filter: &ReportFilter) -> Vec<OrderSnapshot> {
    let mut closed: Vec<_> = orders.into_iter().filter(|o| filter.matches(o)).collect();
    closed.sort_by_key(|o| (ReportFilter::closed_at(o), o.order_number.clone()));
    closed
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub key: String,
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// Business date, `YYYY-MM-DD`
    pub date: String,
    pub order_count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSales {
    pub name: String,
    pub quantity: u64,
    pub revenue: f64,
}

/// Aggregated sales for a range.
///
/// Money totals cover settled orders only; cancelled orders are counted in
/// `cancelled_count`.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub start: i64,
    pub end: i64,
    pub order_count: usize,
    pub cancelled_count: usize,
    pub subtotal: f64,
    pub discount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total: f64,
    pub by_payment_method: Vec<Breakdown>,
    pub by_order_type: Vec<Breakdown>,
    pub daily: Vec<DailyTotal>,
    pub top_items: Vec<ItemSales>,
}

#[derive(Default)]
struct Bucket {
    count: usize,
    total: Decimal,
}

impl Bucket {
    fn add(&mut self, amount: f64) {
        self.count += 1;
        self.total += to_decimal(amount);
    }
}

fn breakdown(buckets: BTreeMap<String, Bucket>) -> Vec<Breakdown> {
    buckets
        .into_iter()
        .map(|(key, b)| Breakdown {
            key,
            count: b.count,
            total: to_f64(b.total),
        })
        .collect()
}

impl SalesReport {
    pub fn build(orders: &[OrderSnapshot], filter: &ReportFilter, tz: Tz) -> Self {
        let mut subtotal = Decimal::ZERO;
        let mut discount = Decimal::ZERO;
        let mut cgst = Decimal::ZERO;
        let mut sgst = Decimal::ZERO;
        let mut total = Decimal::ZERO;
        let mut order_count = 0;
        let mut cancelled_count = 0;

        let mut by_payment: BTreeMap<String, Bucket> = BTreeMap::new();
        let mut by_type: BTreeMap<String, Bucket> = BTreeMap::new();
        let mut by_day: BTreeMap<String, Bucket> = BTreeMap::new();
        let mut items: HashMap<String, (u64, Decimal)> = HashMap::new();

        for order in orders.iter().filter(|o| filter.matches(o)) {
            if order.status == OrderStatus::Cancelled {
                cancelled_count += 1;
                continue;
            }
            order_count += 1;
            subtotal += to_decimal(order.subtotal);
            discount += to_decimal(order.discount);
            cgst += to_decimal(order.cgst);
            sgst += to_decimal(order.sgst);
            total += to_decimal(order.total);

            let method = order
                .payment
                .as_ref()
                .map(|p| p.method.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            by_payment.entry(method).or_default().add(order.total);
            by_type
                .entry(order.order_type.to_string())
                .or_default()
                .add(order.total);

            let closed = order.settled_at.unwrap_or(order.updated_at);
            by_day
                .entry(business_date(closed, tz).to_string())
                .or_default()
                .add(order.total);

            for item in &order.items {
                let entry = items.entry(item.name.clone()).or_default();
                entry.0 += u64::from(item.quantity);
                entry.1 += to_decimal(item.unit_price) * Decimal::from(item.quantity)
                    - to_decimal(item.coupon_discount);
            }
        }

        let mut top_items: Vec<ItemSales> = items
            .into_iter()
            .map(|(name, (quantity, revenue))| ItemSales {
                name,
                quantity,
                revenue: to_f64(revenue),
            })
            .collect();
        top_items.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
        top_items.truncate(TOP_ITEMS);

        Self {
            start: filter.start,
            end: filter.end,
            order_count,
            cancelled_count,
            subtotal: to_f64(subtotal),
            discount: to_f64(discount),
            cgst: to_f64(cgst),
            sgst: to_f64(sgst),
            total: to_f64(total),
            by_payment_method: breakdown(by_payment),
            by_order_type: breakdown(by_type),
            daily: by_day
                .into_iter()
                .map(|(date, b)| DailyTotal {
                    date,
                    order_count: b.count,
                    total: to_f64(b.total),
                })
                .collect(),
            top_items,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shared::order::{LineItem, OrderType, PaymentMethod, PaymentRecord};

    /// 2026-03-10 12:00 IST
    pub const NOON: i64 = 1_773_124_200_000;
    pub const DAY: i64 = 86_400_000;

    pub fn settled(
        id: &str,
        location_id: i64,
        at: i64,
        method: PaymentMethod,
        items: &[(&str, f64, u32)],
    ) -> OrderSnapshot {
        let mut order = OrderSnapshot::new(id.to_string());
        order.order_number = format!("PUN-{id}");
        order.location_id = location_id;
        order.order_type = OrderType::DineIn;
        order.table_ids = vec![1];
        order.status = OrderStatus::Settled;
        order.staff_id = 7;
        order.items = items
            .iter()
            .enumerate()
            .map(|(i, (name, price, qty))| LineItem {
                instance_id: format!("{id}-{i}"),
                menu_item_id: None,
                name: name.to_string(),
                unit_price: *price,
                quantity: *qty,
                modifications: vec![],
                notes: None,
                coupon_discount: 0.0,
            })
            .collect();
        order.subtotal = items.iter().map(|(_, p, q)| p * f64::from(*q)).sum();
        order.cgst = (order.subtotal * 0.025 * 100.0).round() / 100.0;
        order.sgst = order.cgst;
        order.total = order.subtotal + order.cgst + order.sgst;
        order.payment = Some(PaymentRecord {
            method,
            amount: order.total,
            tendered: order.total,
            change: 0.0,
            recorded_by: 2,
            recorded_at: at,
        });
        order.settled_at = Some(at);
        order.updated_at = at;
        order
    }

    pub fn cancelled(id: &str, location_id: i64, at: i64) -> OrderSnapshot {
        let mut order = OrderSnapshot::new(id.to_string());
        order.order_number = format!("PUN-{id}");
        order.location_id = location_id;
        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(at);
        order
    }

    fn filter(scope: LocationScope) -> ReportFilter {
        ReportFilter {
            scope,
            start: NOON - 12 * DAY,
            end: NOON + 12 * DAY,
        }
    }

    #[test]
    fn test_totals_and_breakdowns() {
        let orders = vec![
            settled("a", 10, NOON, PaymentMethod::Cash, &[("Tea", 20.0, 2)]),
            settled("b", 10, NOON + DAY, PaymentMethod::Upi, &[("Tea", 20.0, 1), ("Dosa", 80.0, 1)]),
            cancelled("c", 10, NOON),
        ];
        let report = SalesReport::build(&orders, &filter(LocationScope::All), chrono_tz::Asia::Kolkata);

        assert_eq!(report.order_count, 2);
        assert_eq!(report.cancelled_count, 1);
        assert_eq!(report.subtotal, 140.0);
        assert_eq!(report.cgst, 3.5);
        assert_eq!(report.total, 147.0);
        assert_eq!(
            report.by_payment_method,
            vec![
                Breakdown {
                    key: "cash".into(),
                    count: 1,
                    total: 42.0
                },
                Breakdown {
                    key: "upi".into(),
                    count: 1,
                    total: 105.0
                },
            ]
        );
        assert_eq!(report.by_order_type.len(), 1);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[0].date, "2026-03-10");
        assert_eq!(report.top_items[0].name, "Tea");
        assert_eq!(report.top_items[0].quantity, 3);
        assert_eq!(report.top_items[0].revenue, 60.0);
    }

    #[test]
    fn test_scope_and_range_limit_the_report() {
        let orders = vec![
            settled("a", 10, NOON, PaymentMethod::Cash, &[("Tea", 20.0, 1)]),
            settled("b", 20, NOON, PaymentMethod::Cash, &[("Tea", 20.0, 1)]),
            settled("old", 10, NOON - 30 * DAY, PaymentMethod::Cash, &[("Tea", 20.0, 1)]),
        ];
        let report = SalesReport::build(
            &orders,
            &filter(LocationScope::Only(vec![10])),
            chrono_tz::Asia::Kolkata,
        );
        assert_eq!(report.order_count, 1);
        assert_eq!(report.total, 21.0);
    }

    #[test]
    fn test_open_orders_never_counted() {
        let mut open = settled("a", 10, NOON, PaymentMethod::Cash, &[("Tea", 20.0, 1)]);
        open.status = OrderStatus::PendingSettlement;
        let report = SalesReport::build(&[open], &filter(LocationScope::All), chrono_tz::Asia::Kolkata);
        assert_eq!(report.order_count, 0);
        assert_eq!(report.total, 0.0);
        assert!(report.daily.is_empty());
    }
}
