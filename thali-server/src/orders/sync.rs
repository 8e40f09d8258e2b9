//! Synchronization API for order reconnection
//!
//! This module provides the sync protocol for clients reconnecting after
//! a disconnect. It allows clients to catch up on missed events and to
//! replay the commands they journaled while offline.
//!
//! # Protocol
//!
//! 1. Client reconnects with last known sequence and epoch
//! 2. Server calculates gap
//! 3. If gap is small, return incremental events
//! 4. If gap is large or the epoch changed, return full sync with all
//!    active orders
//! 5. Client posts its pending journal entries; they run in journal order
//!
//! # Guarantees
//!
//! - Events are ordered by sequence
//! - Replaying an already-applied command is a no-op (`duplicate`)
//! - Full sync is always available as fallback

use std::collections::HashMap;

use super::manager::{ManagerError, OrdersManager};
use crate::auth::LocationScope;
use serde::{Deserialize, Serialize};
use shared::order::{OrderCommand, OrderEvent, OrderSnapshot, ReplayResponse, SyncResponse};

/// Maximum events to return in incremental sync
/// If gap exceeds this, full sync is recommended
const MAX_INCREMENTAL_EVENTS: usize = 1000;

/// Maximum commands accepted in one replay batch
pub const MAX_REPLAY_BATCH: usize = 500;

/// Sync request from client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Client's last known sequence number
    #[serde(default)]
    pub since: u64,
    /// Epoch the client last synced against
    #[serde(default)]
    pub epoch: Option<String>,
}

fn full_sync(active_orders: Vec<OrderSnapshot>, server_sequence: u64, epoch: String) -> SyncResponse {
    SyncResponse {
        events: vec![],
        active_orders,
        server_sequence,
        requires_full_sync: true,
        epoch,
    }
}

fn incremental(events: Vec<OrderEvent>, server_sequence: u64, epoch: String) -> SyncResponse {
    SyncResponse {
        events,
        active_orders: vec![],
        server_sequence,
        requires_full_sync: false,
        epoch,
    }
}

/// Sync service for handling reconnection
#[derive(Debug, Clone)]
pub struct SyncService {
    manager: OrdersManager,
}

impl SyncService {
    pub fn new(manager: OrdersManager) -> Self {
        Self { manager }
    }

    /// Handle a sync request, limited to the caller's locations
    pub fn sync(
        &self,
        request: &SyncRequest,
        scope: &LocationScope,
    ) -> Result<SyncResponse, ManagerError> {
        let server_sequence = self.manager.get_current_sequence()?;
        let epoch = self.manager.epoch().to_string();

        let visible_active = || -> Result<Vec<OrderSnapshot>, ManagerError> {
            Ok(self
                .manager
                .get_active_orders()?
                .into_iter()
                .filter(|o| scope.allows(o.location_id))
                .collect())
        };

        // Server restarted since the client last synced
        if request.epoch.as_deref().is_some_and(|e| e != epoch) {
            tracing::debug!(client_epoch = ?request.epoch, "Epoch changed, full sync");
            return Ok(full_sync(visible_active()?, server_sequence, epoch));
        }

        if request.since >= server_sequence {
            return Ok(incremental(vec![], server_sequence, epoch));
        }

        let gap = server_sequence - request.since;
        if gap > MAX_INCREMENTAL_EVENTS as u64 {
            return Ok(full_sync(visible_active()?, server_sequence, epoch));
        }

        let events = self.manager.get_events_since(request.since)?;
        let events = self.filter_events(events, scope)?;
        Ok(incremental(events, server_sequence, epoch))
    }

    fn filter_events(
        &self,
        events: Vec<OrderEvent>,
        scope: &LocationScope,
    ) -> Result<Vec<OrderEvent>, ManagerError> {
        if matches!(scope, LocationScope::All) {
            return Ok(events);
        }
        let mut locations: HashMap<String, i64> = HashMap::new();
        let mut visible = Vec::with_capacity(events.len());
        for event in events {
            let location_id = match locations.get(&event.order_id) {
                Some(id) => *id,
                None => {
                    let id = self
                        .manager
                        .get_snapshot(&event.order_id)?
                        .map(|s| s.location_id)
                        .unwrap_or_default();
                    locations.insert(event.order_id.clone(), id);
                    id
                }
            };
            if scope.allows(location_id) {
                visible.push(event);
            }
        }
        Ok(visible)
    }

    /// Run journaled commands in order.
    ///
    /// Each command stands alone: a rejected entry does not stop the batch,
    /// and its error is returned in its slot.
    pub fn replay(
        &self,
        commands: Vec<OrderCommand>,
        scope: &LocationScope,
    ) -> Result<ReplayResponse, ManagerError> {
        let total = commands.len();
        let results: Vec<_> = commands
            .into_iter()
            .map(|cmd| self.manager.execute_scoped(cmd, scope))
            .collect();
        let duplicates = results.iter().filter(|r| r.duplicate).count();
        let failed = results.iter().filter(|r| !r.success).count();
        tracing::info!(total, duplicates, failed, "Journal replay finished");

        Ok(ReplayResponse {
            results,
            server_sequence: self.manager.get_current_sequence()?,
        })
    }

    /// Compare a stored snapshot with the one rebuilt from its events
    pub fn verify_snapshot(&self, order_id: &str) -> Result<bool, ManagerError> {
        let stored = self.manager.get_snapshot(order_id)?;
        let rebuilt = self.manager.rebuild_snapshot(order_id);

        match (stored, rebuilt) {
            (Some(s), Ok(r)) => Ok(s.status == r.status
                && s.items.len() == r.items.len()
                && (s.total - r.total).abs() < 0.01
                && s.last_sequence == r.last_sequence),
            (None, Err(ManagerError::OrderNotFound(_))) => Ok(true),
            (_, Err(ManagerError::OrderNotFound(_))) | (None, Ok(_)) => Ok(false),
            (_, Err(e)) => Err(e),
        }
    }
}
