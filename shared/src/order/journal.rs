//! Offline command journal
//!
//! Clients record every order command here before sending it. While the
//! server is unreachable, entries stay `Pending`; on reconnect the pending
//! commands are posted in `local_version` order and the server, keyed by
//! `command_id`, applies each at most once. Cached snapshots are reconciled
//! with [`merge_snapshot`], which orders copies by server sequence and never
//! by arrival order.

use super::command::OrderCommand;
use super::snapshot::OrderSnapshot;
use super::types::{CommandErrorCode, CommandResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Persisted format version; bump on incompatible layout changes
pub const JOURNAL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("unsupported journal format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("journal decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryState {
    Pending,
    Applied,
    Rejected {
        code: CommandErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Local, strictly increasing version
    pub local_version: u64,
    pub recorded_at: i64,
    pub command: OrderCommand,
    pub state: EntryState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandJournal {
    format_version: u32,
    next_local_version: u64,
    /// Highest server sequence this client has observed
    #[serde(default)]
    server_sequence: u64,
    entries: Vec<JournalEntry>,
}

impl Default for CommandJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandJournal {
    pub fn new() -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            next_local_version: 1,
            server_sequence: 0,
            entries: Vec::new(),
        }
    }

    /// Append a command and return its local version.
    ///
    /// Recording the same `command_id` twice returns the existing version.
    pub fn record(&mut self, command: OrderCommand) -> u64 {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.command.command_id == command.command_id)
        {
            return existing.local_version;
        }
        let version = self.next_local_version;
        self.next_local_version += 1;
        self.entries.push(JournalEntry {
            local_version: version,
            recorded_at: crate::util::now_millis(),
            command,
            state: EntryState::Pending,
        });
        version
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn pending(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, EntryState::Pending))
    }

    /// Pending commands in the order they were recorded
    pub fn pending_commands(&self) -> Vec<OrderCommand> {
        let mut pending: Vec<&JournalEntry> = self.pending().collect();
        pending.sort_by_key(|e| e.local_version);
        pending.into_iter().map(|e| e.command.clone()).collect()
    }

    /// Record server responses. Unknown command ids are ignored.
    pub fn apply_responses(&mut self, responses: &[CommandResponse]) {
        for response in responses {
            let Some(entry) = self
                .entries
                .iter_mut()
                .find(|e| e.command.command_id == response.command_id)
            else {
                continue;
            };
            entry.state = match (&response.error, response.success) {
                (_, true) => EntryState::Applied,
                (Some(err), false) => EntryState::Rejected {
                    code: err.code,
                    message: err.message.clone(),
                },
                (None, false) => EntryState::Rejected {
                    code: CommandErrorCode::InternalError,
                    message: "rejected without error detail".to_string(),
                },
            };
        }
    }

    /// Drop applied entries; rejected ones stay for the operator to review
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e.state, EntryState::Applied));
        before - self.entries.len()
    }

    pub fn observe_sequence(&mut self, sequence: u64) {
        self.server_sequence = self.server_sequence.max(sequence);
    }

    pub fn server_sequence(&self) -> u64 {
        self.server_sequence
    }

    pub fn to_json(&self) -> Result<String, JournalError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, JournalError> {
        let journal: Self = serde_json::from_str(json)?;
        if journal.format_version != JOURNAL_FORMAT_VERSION {
            return Err(JournalError::UnsupportedVersion {
                found: journal.format_version,
                expected: JOURNAL_FORMAT_VERSION,
            });
        }
        Ok(journal)
    }
}

/// Which copy of an order survives a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    KeepLocal,
    TakeRemote,
}

/// Last-writer-wins by server sequence, then server `updated_at`.
/// Ties keep the local copy.
pub fn merge_decision(local: Option<&OrderSnapshot>, remote: &OrderSnapshot) -> MergeDecision {
    match local {
        None => MergeDecision::TakeRemote,
        Some(local) => {
            let local_key = (local.last_sequence, local.updated_at);
            let remote_key = (remote.last_sequence, remote.updated_at);
            if remote_key > local_key {
                MergeDecision::TakeRemote
            } else {
                MergeDecision::KeepLocal
            }
        }
    }
}

/// Merge a server copy into a client cache. Returns true when replaced.
pub fn merge_snapshot(cache: &mut HashMap<String, OrderSnapshot>, remote: OrderSnapshot) -> bool {
    match merge_decision(cache.get(&remote.order_id), &remote) {
        MergeDecision::TakeRemote => {
            cache.insert(remote.order_id.clone(), remote);
            true
        }
        MergeDecision::KeepLocal => false,
    }
}
