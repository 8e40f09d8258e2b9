//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` (2 dp, half-up) for storage/serialization.
//!
//! ```text
//! subtotal = Σ unit_price × quantity
//! discount = Σ coupon_discount            (one unit per matching line)
//! taxable  = subtotal - discount
//! cgst     = round(taxable × cgst% / 100)
//! sgst     = round(taxable × sgst% / 100)
//! total    = taxable + cgst + sgst
//! ```

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::{CommandErrorCode, LineItemInput, OrderSnapshot, TaxRates};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price (₹10,00,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: u32 = 9999;
/// Maximum allowed tendered amount
const MAX_PAYMENT_AMOUNT: f64 = 10_000_000.0;
const MAX_NAME_LEN: usize = 200;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidAmount(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a quantity (1..=MAX_QUANTITY)
pub fn validate_quantity(quantity: u32) -> Result<(), OrderError> {
    if quantity == 0 {
        return Err(OrderError::InvalidQuantity(
            "quantity must be positive".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidQuantity(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a line item before it enters an order
pub fn validate_line_item(item: &LineItemInput) -> Result<(), OrderError> {
    if item.name.trim().is_empty() || item.name.len() > MAX_NAME_LEN {
        return Err(OrderError::InvalidOperation(
            CommandErrorCode::InvalidOperation,
            format!("item name must be 1..={MAX_NAME_LEN} characters"),
        ));
    }

    require_finite(item.unit_price, "unit_price")?;
    if item.unit_price < 0.0 {
        return Err(OrderError::InvalidAmount(format!(
            "unit_price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_PRICE {
        return Err(OrderError::InvalidAmount(format!(
            "unit_price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.unit_price
        )));
    }

    validate_quantity(item.quantity)
}

/// Validate a tendered amount at settlement
pub fn validate_tendered(tendered: f64) -> Result<(), OrderError> {
    require_finite(tendered, "tendered")?;
    if tendered < 0.0 {
        return Err(OrderError::InvalidAmount(format!(
            "tendered must be non-negative, got {}",
            tendered
        )));
    }
    if tendered > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::InvalidAmount(format!(
            "tendered exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, tendered
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Dish-coupon amount for one unit: `floor(price × pct / 100)`.
///
/// Floor, not round: 169 at 10% gives 16.
pub fn coupon_unit_discount(unit_price: f64, percentage: f64) -> f64 {
    let raw = to_decimal(unit_price) * to_decimal(percentage) / Decimal::ONE_HUNDRED;
    raw.floor().to_f64().unwrap_or_default()
}

/// Tax amounts on a taxable base, each rounded half-up independently
pub fn compute_taxes(taxable: Decimal, tax: &TaxRates) -> (Decimal, Decimal) {
    let cgst = round_money(taxable * to_decimal(tax.cgst_percent) / Decimal::ONE_HUNDRED);
    let sgst = round_money(taxable * to_decimal(tax.sgst_percent) / Decimal::ONE_HUNDRED);
    (cgst, sgst)
}

/// Recompute subtotal, discount, taxes and total from the items
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    let subtotal: Decimal = snapshot
        .items
        .iter()
        .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
        .sum();
    let discount: Decimal = snapshot
        .items
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| to_decimal(item.coupon_discount))
        .sum();

    let subtotal = round_money(subtotal);
    let discount = round_money(discount.min(subtotal));
    let taxable = subtotal - discount;
    let (cgst, sgst) = compute_taxes(taxable, &snapshot.tax);
    let total = taxable + cgst + sgst;

    snapshot.subtotal = to_f64(subtotal);
    snapshot.discount = to_f64(discount);
    snapshot.cgst = to_f64(cgst);
    snapshot.sgst = to_f64(sgst);
    snapshot.total = to_f64(total);
}

/// Check if payment is sufficient (exact to the paisa)
pub fn is_payment_sufficient(tendered: f64, required: f64) -> bool {
    round_money(to_decimal(tendered)) >= round_money(to_decimal(required))
}

/// `tendered - total`, never negative
pub fn change_due(tendered: f64, total: f64) -> f64 {
    to_f64((to_decimal(tendered) - to_decimal(total)).max(Decimal::ZERO))
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}
