//! Shared types for the Thali POS
//!
//! Tenant and catalog models, order commands/events/snapshots, the offline
//! command journal, change-feed messages and the unified error system. Used by
//! the server and by clients.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use message::{BusMessage, EventType};
