//! Change-feed message types
//!
//! Published on the server's in-process bus and streamed to clients over
//! Server-Sent Events. Delivery is best effort and eventually consistent;
//! order events carry their own `sequence` for ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::order::OrderEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An order event committed by the order engine
    OrderEvent,
    /// A catalog / tenant / table document changed
    Sync,
    /// Human-facing notice (printer offline, reconciliation result, ...)
    Notification,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::OrderEvent => write!(f, "order_event"),
            EventType::Sync => write!(f, "sync"),
            EventType::Notification => write!(f, "notification"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
}

/// Document change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Collection name, e.g. "dining_tables", "menu_items"
    pub resource: String,
    pub action: SyncAction,
    pub id: String,
    /// Current document, `None` when deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// Message bus envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    /// Location the change belongs to; `None` = franchise-wide or global
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    pub payload: serde_json::Value,
}

impl BusMessage {
    pub fn new(event_type: EventType, location_id: Option<i64>, payload: serde_json::Value) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            location_id,
            payload,
        }
    }

    pub fn order_event(location_id: i64, event: &OrderEvent) -> Self {
        Self::new(
            EventType::OrderEvent,
            Some(location_id),
            serde_json::to_value(event).unwrap_or(serde_json::Value::Null),
        )
    }

    pub fn sync(location_id: Option<i64>, payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            location_id,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }

    pub fn notification(location_id: Option<i64>, payload: &NotificationPayload) -> Self {
        Self::new(
            EventType::Notification,
            location_id,
            serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        )
    }

    /// Parse the payload as a typed value
    pub fn parse_payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
