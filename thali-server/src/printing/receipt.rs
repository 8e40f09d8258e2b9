//! Customer receipt renderer
//!
//! Lays an order out as a [`Document`] so the same receipt can go to the
//! thermal printer as ESC/POS or back to the client as plain text.

use chrono_tz::Tz;
use shared::models::Location;
use shared::order::{OrderSnapshot, OrderType};
use thali_printer::{DEFAULT_WIDTH, Document};

use crate::utils::time::format_local;

/// Receipt renderer for one location
pub struct ReceiptRenderer<'a> {
    location: &'a Location,
    timezone: Tz,
    width: usize,
}

impl<'a> ReceiptRenderer<'a> {
    pub fn new(location: &'a Location, timezone: Tz) -> Self {
        Self {
            location,
            timezone,
            width: DEFAULT_WIDTH,
        }
    }

    /// `table_numbers` are the display numbers of the order's tables
    pub fn render(&self, order: &OrderSnapshot, table_numbers: &[String]) -> Document {
        let mut doc = Document::new(self.width);

        self.render_header(&mut doc);
        self.render_order_info(&mut doc, order, table_numbers);
        self.render_items(&mut doc, order);
        self.render_totals(&mut doc, order);
        self.render_footer(&mut doc);

        doc
    }

    fn render_header(&self, doc: &mut Document) {
        doc.title(&self.location.name);
        if let Some(address) = &self.location.address {
            doc.centered(address);
        }
        for line in &self.location.receipt_header {
            doc.centered(line);
        }
        if let Some(gstin) = &self.location.gstin {
            doc.centered(format!("GSTIN: {}", gstin));
        }
        doc.double_rule();
    }

    fn render_order_info(&self, doc: &mut Document, order: &OrderSnapshot, table_numbers: &[String]) {
        doc.pair("Order", &order.order_number);
        let when = order.settled_at.unwrap_or(order.created_at);
        doc.pair("Date", format_local(when, self.timezone));
        match order.order_type {
            OrderType::DineIn => {
                let label = if table_numbers.len() > 1 { "Tables" } else { "Table" };
                doc.pair(label, table_numbers.join(", "));
            }
            OrderType::Delivery => {
                doc.pair("Type", "Delivery");
            }
        }
        if let Some(customer) = &order.customer {
            if let Some(name) = &customer.name {
                doc.pair("Customer", name);
            }
            if let Some(phone) = &customer.phone {
                doc.pair("Phone", phone);
            }
        }
        doc.pair("Served by", &order.staff_name);
        doc.rule();
    }

    fn render_items(&self, doc: &mut Document, order: &OrderSnapshot) {
        for item in &order.items {
            doc.pair(
                format!("{} x{}", item.name, item.quantity),
                money(item.unit_price * f64::from(item.quantity)),
            );
            if !item.modifications.is_empty() {
                doc.text(format!("  ({})", item.modifications.join(", ")));
            }
            if item.coupon_discount > 0.0 {
                doc.pair("  Coupon", format!("-{}", money(item.coupon_discount)));
            }
        }
        doc.rule();
    }

    fn render_totals(&self, doc: &mut Document, order: &OrderSnapshot) {
        doc.pair("Subtotal", money(order.subtotal));
        if order.discount > 0.0 {
            let label = match &order.coupon {
                Some(coupon) => format!("Discount ({})", coupon.code),
                None => "Discount".to_string(),
            };
            doc.pair(label, format!("-{}", money(order.discount)));
        }
        doc.pair(format!("CGST {}%", order.tax.cgst_percent), money(order.cgst));
        doc.pair(format!("SGST {}%", order.tax.sgst_percent), money(order.sgst));
        doc.double_rule();
        doc.pair_bold("TOTAL", money(order.total));

        if let Some(payment) = &order.payment {
            doc.pair(
                format!("Paid ({})", payment.method.to_string().to_uppercase()),
                money(payment.tendered),
            );
            if payment.change > 0.0 {
                doc.pair("Change", money(payment.change));
            }
        }
    }

    fn render_footer(&self, doc: &mut Document) {
        doc.blank();
        if self.location.receipt_footer.is_empty() {
            doc.centered("Thank you! Visit again");
        }
        for line in &self.location.receipt_footer {
            doc.centered(line);
        }
    }
}

fn money(value: f64) -> String {
    format!("₹{:.2}", value)
}
