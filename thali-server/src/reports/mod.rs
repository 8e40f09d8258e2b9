//! Sales reports
//!
//! One aggregation for every role: the caller's [`LocationScope`] decides
//! which locations are counted, nothing else changes.
//!
//! An order belongs to the range by its closing time: `settled_at` for
//! settled orders, `cancelled_at` for cancelled ones. Open orders never
//! appear in a report.
//!
//! [`LocationScope`]: crate::auth::LocationScope

pub mod export;
pub mod summary;

pub use export::{CSV_HEADER, ReportError, orders_csv};
pub use summary::{Breakdown, DailyTotal, ItemSales, ReportFilter, SalesReport, closed_orders};
