//! Order commands - requests from clients to change an order

use super::types::{CustomerInfo, LineItemInput, OrderType, PaymentMethod};
use crate::models::Role;
use serde::{Deserialize, Serialize};

/// Order command
///
/// `command_id` is generated by the client and is the idempotency key: the
/// server applies each id at most once. Operator fields are overwritten by
/// the server from the authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    /// Client timestamp (Unix millis)
    pub timestamp: i64,
    pub operator_id: i64,
    pub operator_name: String,
    pub operator_role: Role,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(
        operator_id: i64,
        operator_name: impl Into<String>,
        operator_role: Role,
        payload: OrderCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            timestamp: crate::util::now_millis(),
            operator_id,
            operator_name: operator_name.into(),
            operator_role,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Create an order. `confirm = false` keeps it `Temporary` (a draft the
    /// waiter is still composing); tables are held either way.
    CreateOrder {
        location_id: i64,
        order_type: OrderType,
        #[serde(default)]
        table_ids: Vec<i64>,
        #[serde(default)]
        items: Vec<LineItemInput>,
        #[serde(default)]
        customer: Option<CustomerInfo>,
        #[serde(default = "default_confirm")]
        confirm: bool,
    },
    ConfirmOrder {
        order_id: String,
    },
    AddItems {
        order_id: String,
        items: Vec<LineItemInput>,
    },
    ModifyItemQuantity {
        order_id: String,
        instance_id: String,
        quantity: u32,
    },
    RemoveItem {
        order_id: String,
        instance_id: String,
    },
    UpdateCustomer {
        order_id: String,
        customer: CustomerInfo,
    },
    ApplyDishCoupon {
        order_id: String,
        code: String,
    },
    /// "Go for bill": hand the order to a manager
    TransferOrder {
        order_id: String,
    },
    /// Manager sends a transferred order back to staff
    ReturnToStaff {
        order_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    AcceptOrder {
        order_id: String,
    },
    SettleOrder {
        order_id: String,
        method: PaymentMethod,
        tendered: f64,
    },
    CancelOrder {
        order_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
}

fn default_confirm() -> bool {
    true
}

impl OrderCommandPayload {
    /// Target order, `None` for `CreateOrder`
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::CreateOrder { .. } => None,
            OrderCommandPayload::ConfirmOrder { order_id }
            | OrderCommandPayload::AddItems { order_id, .. }
            | OrderCommandPayload::ModifyItemQuantity { order_id, .. }
            | OrderCommandPayload::RemoveItem { order_id, .. }
            | OrderCommandPayload::UpdateCustomer { order_id, .. }
            | OrderCommandPayload::ApplyDishCoupon { order_id, .. }
            | OrderCommandPayload::TransferOrder { order_id }
            | OrderCommandPayload::ReturnToStaff { order_id, .. }
            | OrderCommandPayload::AcceptOrder { order_id }
            | OrderCommandPayload::SettleOrder { order_id, .. }
            | OrderCommandPayload::CancelOrder { order_id, .. } => Some(order_id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderCommandPayload::CreateOrder { .. } => "create_order",
            OrderCommandPayload::ConfirmOrder { .. } => "confirm_order",
            OrderCommandPayload::AddItems { .. } => "add_items",
            OrderCommandPayload::ModifyItemQuantity { .. } => "modify_item_quantity",
            OrderCommandPayload::RemoveItem { .. } => "remove_item",
            OrderCommandPayload::UpdateCustomer { .. } => "update_customer",
            OrderCommandPayload::ApplyDishCoupon { .. } => "apply_dish_coupon",
            OrderCommandPayload::TransferOrder { .. } => "transfer_order",
            OrderCommandPayload::ReturnToStaff { .. } => "return_to_staff",
            OrderCommandPayload::AcceptOrder { .. } => "accept_order",
            OrderCommandPayload::SettleOrder { .. } => "settle_order",
            OrderCommandPayload::CancelOrder { .. } => "cancel_order",
        }
    }
}
