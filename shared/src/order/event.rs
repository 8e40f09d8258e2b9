//! Order events - immutable facts recorded after command processing

use super::snapshot::OrderStatus;
use super::types::{AppliedCoupon, CustomerInfo, LineItem, OrderType, PaymentRecord, TaxRates};
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: String,
    /// Global sequence number; the authoritative ordering for replay and
    /// for resolving cached copies
    pub sequence: u64,
    pub order_id: String,
    /// Server timestamp (Unix millis)
    pub timestamp: i64,
    /// Client timestamp from the command, kept for audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    pub operator_id: i64,
    pub operator_name: String,
    pub command_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    OrderConfirmed,
    ItemsAdded,
    ItemQuantityChanged,
    ItemRemoved,
    CustomerUpdated,
    DishCouponApplied,
    OrderTransferred,
    TransferReturned,
    OrderAccepted,
    OrderSettled,
    OrderCancelled,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderEventType::OrderCreated => "ORDER_CREATED",
            OrderEventType::OrderConfirmed => "ORDER_CONFIRMED",
            OrderEventType::ItemsAdded => "ITEMS_ADDED",
            OrderEventType::ItemQuantityChanged => "ITEM_QUANTITY_CHANGED",
            OrderEventType::ItemRemoved => "ITEM_REMOVED",
            OrderEventType::CustomerUpdated => "CUSTOMER_UPDATED",
            OrderEventType::DishCouponApplied => "DISH_COUPON_APPLIED",
            OrderEventType::OrderTransferred => "ORDER_TRANSFERRED",
            OrderEventType::TransferReturned => "TRANSFER_RETURNED",
            OrderEventType::OrderAccepted => "ORDER_ACCEPTED",
            OrderEventType::OrderSettled => "ORDER_SETTLED",
            OrderEventType::OrderCancelled => "ORDER_CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        location_id: i64,
        order_number: String,
        order_type: OrderType,
        table_ids: Vec<i64>,
        tax: TaxRates,
        /// `Temporary` or `Ongoing`
        initial_status: OrderStatus,
        #[serde(default)]
        customer: Option<CustomerInfo>,
    },
    OrderConfirmed,
    ItemsAdded {
        items: Vec<LineItem>,
    },
    ItemQuantityChanged {
        instance_id: String,
        name: String,
        previous_quantity: u32,
        quantity: u32,
    },
    ItemRemoved {
        instance_id: String,
        name: String,
        quantity: u32,
    },
    CustomerUpdated {
        customer: CustomerInfo,
    },
    DishCouponApplied {
        coupon: AppliedCoupon,
    },
    OrderTransferred {
        /// Order total at the moment of transfer (audit)
        total: f64,
    },
    TransferReturned {
        #[serde(default)]
        reason: Option<String>,
    },
    OrderAccepted {
        manager_id: i64,
        manager_name: String,
    },
    OrderSettled {
        payment: PaymentRecord,
        released_table_ids: Vec<i64>,
    },
    OrderCancelled {
        #[serde(default)]
        reason: Option<String>,
        released_table_ids: Vec<i64>,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> OrderEventType {
        match self {
            EventPayload::OrderCreated { .. } => OrderEventType::OrderCreated,
            EventPayload::OrderConfirmed => OrderEventType::OrderConfirmed,
            EventPayload::ItemsAdded { .. } => OrderEventType::ItemsAdded,
            EventPayload::ItemQuantityChanged { .. } => OrderEventType::ItemQuantityChanged,
            EventPayload::ItemRemoved { .. } => OrderEventType::ItemRemoved,
            EventPayload::CustomerUpdated { .. } => OrderEventType::CustomerUpdated,
            EventPayload::DishCouponApplied { .. } => OrderEventType::DishCouponApplied,
            EventPayload::OrderTransferred { .. } => OrderEventType::OrderTransferred,
            EventPayload::TransferReturned { .. } => OrderEventType::TransferReturned,
            EventPayload::OrderAccepted { .. } => OrderEventType::OrderAccepted,
            EventPayload::OrderSettled { .. } => OrderEventType::OrderSettled,
            EventPayload::OrderCancelled { .. } => OrderEventType::OrderCancelled,
        }
    }
}

impl OrderEvent {
    /// Create a new event; the server timestamp is taken here
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: i64,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp: crate::util::now_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type: payload.event_type(),
            payload,
        }
    }
}
