//! Order Event Sourcing Module
//!
//! This module implements order management using event sourcing:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **actions**: One command handler per order command
//! - **appliers**: One event applier per event type
//! - **storage**: redb-based persistence layer for events, snapshots, and indices
//! - **occupancy**: Table occupy/release inside the command transaction
//! - **money**: Decimal totals, GST and dish-coupon arithmetic
//! - **reducer**: Event replay and line-item construction
//! - **reconcile**: Cross-record consistency scan and repair
//! - **sync**: Reconnection and offline-journal replay
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast          Snapshot Update
//!                 ↓
//!           All Subscribers
//! ```
//!
//! # Data Flow
//!
//! 1. Client sends OrderCommand over HTTP
//! 2. OrdersManager checks capability, idempotency and tenant scope
//! 3. The action validates and emits OrderEvents with global sequences
//! 4. Events, snapshot, pending record and tables commit in one transaction
//! 5. Events are broadcast to all subscribers
//! 6. CommandResponse is returned to client

// Declared first: enum_dispatch expands the trait impls at the enum sites
pub mod traits;

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod money;
pub mod occupancy;
pub mod reconcile;
pub mod reducer;
pub mod storage;
pub mod sync;

// Re-exports
pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use reconcile::{Issue, ReconcileError, ReconcileReport, Reconciler};
pub use reducer::{generate_instance_id, rebuild_snapshot};
pub use storage::OrderStorage;
pub use sync::{SyncRequest, SyncService};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot, OrderStatus,
};
