//! Event Router - forwards committed order events to the change feed
//!
//! ```text
//! OrdersManager (broadcast<OrderEvent>)
//!        │
//!        └── EventRouter ── location lookup ──► MessageBus (BusMessage::order_event)
//! ```
//!
//! Events carry no location, so the router resolves it from the order
//! snapshot once per order and caches it. Orders never change location.

use std::collections::HashMap;

use shared::message::BusMessage;
use shared::order::OrderEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::message::MessageBus;
use crate::orders::OrdersManager;

/// Cached order → location entries before the cache is cleared
const LOCATION_CACHE_LIMIT: usize = 10_000;

pub struct EventRouter {
    manager: OrdersManager,
    bus: MessageBus,
    locations: HashMap<String, i64>,
}

impl EventRouter {
    pub fn new(manager: OrdersManager, bus: MessageBus) -> Self {
        Self {
            manager,
            bus,
            locations: HashMap::new(),
        }
    }

    /// Run until the source closes or `shutdown` fires
    pub async fn run(
        mut self,
        mut source: broadcast::Receiver<OrderEvent>,
        shutdown: CancellationToken,
    ) {
        tracing::info!("Event router started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Event router stopping");
                    break;
                }
                received = source.recv() => match received {
                    Ok(event) => self.dispatch(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Clients detect the sequence gap and resync
                        tracing::warn!(skipped = n, "Event router lagged, events not forwarded");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Source channel closed, event router stopping");
                        break;
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, event: &OrderEvent) {
        let Some(location_id) = self.location_of(&event.order_id) else {
            tracing::warn!(order_id = %event.order_id, "Order location unknown, event not forwarded");
            return;
        };
        self.bus.publish(BusMessage::order_event(location_id, event));
    }

    fn location_of(&mut self, order_id: &str) -> Option<i64> {
        if let Some(id) = self.locations.get(order_id) {
            return Some(*id);
        }
        let location_id = match self.manager.get_snapshot(order_id) {
            Ok(Some(snapshot)) => snapshot.location_id,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to load order snapshot");
                return None;
            }
        };
        if self.locations.len() >= LOCATION_CACHE_LIMIT {
            self.locations.clear();
        }
        self.locations.insert(order_id.to_string(), location_id);
        Some(location_id)
    }
}
