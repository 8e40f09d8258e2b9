//! In-process change feed
//!
//! ```text
//! OrdersManager ──► EventRouter ──┐
//! CRUD handlers ──────────────────┼──► MessageBus (broadcast) ──► SSE clients
//! Background tasks ───────────────┘                               (filtered by scope)
//! ```

pub mod bus;
pub mod filter;

pub use bus::MessageBus;
pub use filter::visible_to;
pub use shared::message::{
    BusMessage, EventType, NotificationLevel, NotificationPayload, SyncAction, SyncPayload,
};
