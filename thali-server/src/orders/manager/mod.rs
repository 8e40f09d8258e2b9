//! OrdersManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Snapshot updates
//! - Event broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute_scoped(cmd, scope)
//!     ├─ 1. Capability check (role → capability)
//!     ├─ 2. Idempotency check (command_id)
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Tenant scope check (location of the target order)
//!     ├─ 5. Convert command to action and execute
//!     ├─ 6. Apply events to snapshots via EventApplier
//!     ├─ 7. Persist events and snapshots
//!     ├─ 8. Mark command processed
//!     ├─ 9. Commit transaction
//!     ├─ 10. Broadcast event(s)
//!     └─ 11. Return response
//! ```
//!
//! Table status, pending records and the order-number counter are written by
//! the actions into the same transaction, so a failed command leaves all of
//! them untouched.

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::appliers::EventAction;
use super::reducer;
use super::storage::OrderStorage;
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier};
use crate::auth::LocationScope;
use chrono_tz::Tz;
use redb::Database;
use shared::models::role_allows;
use shared::order::{CommandResponse, OrderCommand, OrderEvent, OrderSnapshot, PendingRecord};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 65536;

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    /// Business timezone; dates order numbers
    tz: Tz,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("tz", &self.tz)
            .finish()
    }
}

impl OrdersManager {
    /// Create a manager on the shared database
    pub fn new(db: Arc<Database>, tz: Tz) -> ManagerResult<Self> {
        let storage = OrderStorage::from_database(db)?;
        let manager = Self::with_storage(storage, tz);
        tracing::info!(epoch = %manager.epoch, tz = %tz, "OrdersManager started with new epoch");
        Ok(manager)
    }

    /// Create an OrdersManager with existing storage
    pub fn with_storage(storage: OrderStorage, tz: Tz) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            event_tx,
            epoch: uuid::Uuid::new_v4().to_string(),
            tz,
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Subscribe to committed events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Execute a command without a tenant restriction
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        self.execute_scoped(cmd, &LocationScope::All)
    }

    /// Execute a command on behalf of an operator limited to `scope`
    pub fn execute_scoped(&self, cmd: OrderCommand, scope: &LocationScope) -> CommandResponse {
        self.execute_with_events(cmd, scope).0
    }

    /// Execute a command and return both the response and generated events
    pub fn execute_with_events(
        &self,
        cmd: OrderCommand,
        scope: &LocationScope,
    ) -> (CommandResponse, Vec<OrderEvent>) {
        let command_id = cmd.command_id.clone();
        match self.process_command(cmd, scope) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in &events {
                    if self.event_tx.send(event.clone()).is_err() {
                        tracing::trace!("Event broadcast skipped: no active receivers");
                        break;
                    }
                }
                (response, events)
            }
            Err(err) => {
                tracing::debug!(command_id = %command_id, error = %err, "Command rejected");
                (CommandResponse::error(command_id, err.into()), vec![])
            }
        }
    }

    /// Process command and return response with events
    fn process_command(
        &self,
        cmd: OrderCommand,
        scope: &LocationScope,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, command = cmd.payload.name(), "Processing command");

        let action = CommandAction::from_command(&cmd, self.tz);

        // 1. Capability check
        if let Some(capability) = action.required_capability()
            && !role_allows(cmd.operator_role, capability)
        {
            return Err(ManagerError::PermissionDenied(format!(
                "{} lacks {}",
                cmd.operator_role.as_str(),
                capability
            )));
        }

        // 2. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 3. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check inside the transaction (redb serializes writers)
        if self.storage.is_command_processed_txn(&txn, &cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command (in txn)");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        let current_sequence = self.storage.get_current_sequence_txn(&txn)?;
        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);

        // 4. Tenant scope check
        let location_id = match (&action, cmd.payload.order_id()) {
            (CommandAction::CreateOrder(create), _) => Some(create.location_id),
            (_, Some(order_id)) => Some(ctx.load_snapshot(order_id)?.location_id),
            _ => None,
        };
        if let Some(location_id) = location_id
            && !scope.allows(location_id)
        {
            return Err(ManagerError::OutsideTenantScope(format!(
                "location {location_id}"
            )));
        }

        // 5. Execute action
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id,
            operator_name: cmd.operator_name.clone(),
            role: cmd.operator_role,
            timestamp: cmd.timestamp,
        };
        let events = action.execute(&mut ctx, &metadata)?;

        // 6. Apply events to snapshots
        for event in &events {
            let mut snapshot = ctx
                .load_snapshot(&event.order_id)
                .unwrap_or_else(|_| ctx.create_snapshot(event.order_id.clone()));
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
            ctx.save_snapshot(snapshot);
        }

        // 7. Persist events, snapshots and the active index
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }
        for snapshot in ctx.modified_snapshots() {
            self.storage.store_snapshot(&txn, snapshot)?;
            if snapshot.is_terminal() {
                self.storage.mark_order_inactive(&txn, &snapshot.order_id)?;
            } else {
                self.storage.mark_order_active(&txn, &snapshot.order_id)?;
            }
        }

        let max_sequence = ctx.current_sequence();
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 8. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 9. Commit transaction
        drop(ctx);
        txn.commit()?;

        let order_id = events.first().map(|e| e.order_id.clone());
        tracing::info!(
            command_id = %cmd.command_id,
            command = cmd.payload.name(),
            order_id = ?order_id,
            event_count = events.len(),
            "Command processed successfully"
        );
        Ok((CommandResponse::success(cmd.command_id, order_id), events))
    }

    // ========== Public Query Methods ==========

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> ManagerResult<Option<OrderSnapshot>> {
        Ok(self.storage.get_snapshot(order_id)?)
    }

    /// Get all non-terminal order snapshots
    pub fn get_active_orders(&self) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.get_active_orders()?)
    }

    /// Every order ever created (reports, reconciliation)
    pub fn get_all_orders(&self) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.get_all_snapshots()?)
    }

    /// The manager queue
    pub fn get_pending_records(&self) -> ManagerResult<Vec<PendingRecord>> {
        Ok(self.storage.get_pending_records()?)
    }

    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Get all events for a specific order
    pub fn get_events_for_order(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    /// Rebuild a snapshot from events (for verification)
    pub fn rebuild_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        let events = self.storage.get_events_for_order(order_id)?;
        reducer::rebuild_snapshot(order_id, &events)
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }
}

#[cfg(test)]
mod tests;
