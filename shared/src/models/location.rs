//! Location Model
//!
//! A location is one restaurant outlet of a franchise. It owns tables, menu,
//! coupons and orders, and carries the tax and receipt settings that orders
//! snapshot at creation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default raw-TCP port of network thermal printers
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Location entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub franchise_id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Prefix of human-readable order numbers, e.g. `BLR1` in `BLR1-20250114-0007`
    pub order_prefix: String,
    pub cgst_percent: f64,
    pub sgst_percent: f64,
    #[serde(default)]
    pub gstin: Option<String>,
    /// Thermal printer IPv4/hostname; printing is disabled when unset
    #[serde(default)]
    pub printer_ip: Option<String>,
    #[serde(default = "default_printer_port")]
    pub printer_port: u16,
    #[serde(default)]
    pub receipt_header: Vec<String>,
    #[serde(default)]
    pub receipt_footer: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_printer_port() -> u16 {
    DEFAULT_PRINTER_PORT
}

/// Create location payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationCreate {
    pub franchise_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 12))]
    pub order_prefix: String,
    #[validate(range(min = 0.0, max = 50.0))]
    pub cgst_percent: f64,
    #[validate(range(min = 0.0, max = 50.0))]
    pub sgst_percent: f64,
    #[validate(length(max = 15))]
    pub gstin: Option<String>,
    pub printer_ip: Option<String>,
    pub printer_port: Option<u16>,
    #[serde(default)]
    pub receipt_header: Vec<String>,
    #[serde(default)]
    pub receipt_footer: Vec<String>,
}

/// Update location payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LocationUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 12))]
    pub order_prefix: Option<String>,
    #[validate(range(min = 0.0, max = 50.0))]
    pub cgst_percent: Option<f64>,
    #[validate(range(min = 0.0, max = 50.0))]
    pub sgst_percent: Option<f64>,
    #[validate(length(max = 15))]
    pub gstin: Option<String>,
    pub printer_ip: Option<String>,
    pub printer_port: Option<u16>,
    pub receipt_header: Option<Vec<String>>,
    pub receipt_footer: Option<Vec<String>>,
    pub is_active: Option<bool>,
}
