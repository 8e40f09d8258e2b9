//! Order value types shared by commands, events and snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dine-in orders hold tables; delivery orders never do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Delivery,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::DineIn => f.write_str("dine_in"),
            OrderType::Delivery => f.write_str("delivery"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("cash"),
            PaymentMethod::Card => f.write_str("card"),
            PaymentMethod::Upi => f.write_str("upi"),
        }
    }
}

/// Tax percentages snapshotted from the location when the order is created
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxRates {
    pub cgst_percent: f64,
    pub sgst_percent: f64,
}

/// Line item as sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Menu item reference; free-text items (e.g. "open food") have none
    #[serde(default)]
    pub menu_item_id: Option<i64>,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub modifications: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Line item inside an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stable id of this line within the order
    pub instance_id: String,
    #[serde(default)]
    pub menu_item_id: Option<i64>,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub modifications: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Dish-coupon amount taken off one unit of this line
    #[serde(default)]
    pub coupon_discount: f64,
}

/// Optional customer details (mostly for delivery)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl CustomerInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.city.is_none()
    }
}

/// Dish coupon applied to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub coupon_id: i64,
    pub code: String,
    pub menu_item_id: i64,
    pub percentage: f64,
}

/// Payment recorded at settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub method: PaymentMethod,
    /// Amount due (the order total)
    pub amount: f64,
    /// Amount handed over by the customer
    pub tendered: f64,
    /// `tendered - amount`
    pub change: f64,
    pub recorded_by: i64,
    pub recorded_at: i64,
}

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: String,
    pub success: bool,
    /// Order the command acted on (set for every successful order command)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// True when the command id had already been processed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            duplicate: false,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            duplicate: false,
            error: Some(error),
        }
    }

    /// Already processed: reported as success so retries are harmless
    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            duplicate: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    PermissionDenied,
    OutsideTenantScope,
    LocationNotFound,
    OrderNotFound,
    OrderAlreadySettled,
    OrderAlreadyCancelled,
    InvalidTransition,
    OrderEmpty,
    ItemNotFound,
    InvalidQuantity,
    InvalidAmount,
    InvalidOperation,
    InsufficientPayment,
    TableNotFound,
    TableOccupied,
    TableReserved,
    PendingRecordExists,
    PendingRecordNotFound,
    CouponNotFound,
    CouponInactive,
    CouponNotApplicable,
    InternalError,
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}

impl From<CommandErrorCode> for crate::error::ErrorCode {
    fn from(code: CommandErrorCode) -> Self {
        use crate::error::ErrorCode;
        match code {
            CommandErrorCode::PermissionDenied => ErrorCode::PermissionDenied,
            CommandErrorCode::OutsideTenantScope => ErrorCode::OutsideTenantScope,
            CommandErrorCode::LocationNotFound => ErrorCode::LocationNotFound,
            CommandErrorCode::OrderNotFound => ErrorCode::OrderNotFound,
            CommandErrorCode::OrderAlreadySettled => ErrorCode::OrderAlreadySettled,
            CommandErrorCode::OrderAlreadyCancelled => ErrorCode::OrderAlreadyCancelled,
            CommandErrorCode::InvalidTransition => ErrorCode::InvalidOrderTransition,
            CommandErrorCode::OrderEmpty => ErrorCode::OrderEmpty,
            CommandErrorCode::ItemNotFound => ErrorCode::OrderItemNotFound,
            CommandErrorCode::InvalidQuantity => ErrorCode::InvalidQuantity,
            CommandErrorCode::InvalidAmount => ErrorCode::PaymentInvalidAmount,
            CommandErrorCode::InvalidOperation => ErrorCode::InvalidRequest,
            CommandErrorCode::InsufficientPayment => ErrorCode::PaymentInsufficientAmount,
            CommandErrorCode::TableNotFound => ErrorCode::TableNotFound,
            CommandErrorCode::TableOccupied => ErrorCode::TableOccupied,
            CommandErrorCode::TableReserved => ErrorCode::TableReserved,
            CommandErrorCode::PendingRecordExists => ErrorCode::PendingRecordExists,
            CommandErrorCode::PendingRecordNotFound => ErrorCode::PendingRecordNotFound,
            CommandErrorCode::CouponNotFound => ErrorCode::CouponNotFound,
            CommandErrorCode::CouponInactive => ErrorCode::CouponInactive,
            CommandErrorCode::CouponNotApplicable => ErrorCode::CouponNotApplicable,
            CommandErrorCode::InternalError => ErrorCode::InternalError,
            CommandErrorCode::StorageFull => ErrorCode::StorageFull,
            CommandErrorCode::OutOfMemory => ErrorCode::OutOfMemory,
            CommandErrorCode::StorageCorrupted => ErrorCode::StorageCorrupted,
            CommandErrorCode::SystemBusy => ErrorCode::SystemBusy,
        }
    }
}

/// Events since a sequence, for clients catching up after a disconnect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub events: Vec<super::event::OrderEvent>,
    pub active_orders: Vec<super::snapshot::OrderSnapshot>,
    pub server_sequence: u64,
    /// Server restarted with a different epoch; client must drop its cache
    pub requires_full_sync: bool,
    pub epoch: String,
}

/// Journal entries posted by a client that was offline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayRequest {
    pub commands: Vec<super::command::OrderCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResponse {
    /// One response per command, in request order
    pub results: Vec<CommandResponse>,
    pub server_sequence: u64,
}
