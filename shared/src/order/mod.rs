//! Order event sourcing types
//!
//! - Commands: requests from clients to change orders
//! - Events: immutable facts recorded after command processing
//! - Snapshots: order state folded from the event stream
//! - Pending records: the manager's copy of a transferred order
//! - Journal: the client-side write-ahead log used while offline

pub mod command;
pub mod event;
pub mod journal;
pub mod pending;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use journal::{CommandJournal, EntryState, JournalEntry, JournalError, merge_snapshot};
pub use pending::PendingRecord;
pub use snapshot::{OrderSnapshot, OrderStatus};
pub use types::*;
