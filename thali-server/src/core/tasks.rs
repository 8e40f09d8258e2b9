//! Background task management
//!
//! - [`TaskKind::Listener`] - event forwarding (order events → change feed)
//! - [`TaskKind::Periodic`] - timed jobs (reservation sweep)

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shared::message::{BusMessage, SyncAction, SyncPayload};
use shared::util::now_millis;

use crate::db::DbService;
use crate::db::repository::DiningTableRepository;
use crate::message::MessageBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Listener,
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Listener => write!(f, "Listener"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Owns every background task and their shared shutdown token
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn a task; panics are caught and logged
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let wrapped_future = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) if shutdown.is_cancelled() => {}
                Ok(()) => {
                    tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(task = %name, kind = %kind, panic = %panic_msg, "Background task panicked");
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every task and wait up to `timeout` for each
    pub async fn shutdown(self, timeout: Duration) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            match tokio::time::timeout(timeout, task.handle).await {
                Ok(Ok(())) => tracing::debug!(task = %task.name, "Task completed"),
                Ok(Err(e)) => tracing::error!(task = %task.name, error = ?e, "Task failed"),
                Err(_) => tracing::warn!(task = %task.name, kind = %task.kind, "Task did not stop in time"),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

/// Reset expired reservations every `interval` and announce the changes
pub async fn reservation_sweeper(
    db: DbService,
    bus: MessageBus,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let repo = DiningTableRepository::new(db);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }
        sweep_once(&repo, &bus, now_millis());
    }
}

/// One sweep; returns how many tables were reset
pub fn sweep_once(repo: &DiningTableRepository, bus: &MessageBus, now: i64) -> usize {
    match repo.sweep_expired_reservations(now) {
        Ok(changed) => {
            for table in &changed {
                let payload = SyncPayload {
                    resource: "dining_tables".into(),
                    action: SyncAction::Updated,
                    id: table.id.to_string(),
                    data: serde_json::to_value(table).ok(),
                };
                bus.publish(BusMessage::sync(Some(table.location_id), &payload));
            }
            if !changed.is_empty() {
                tracing::info!(count = changed.len(), "Expired reservations released");
            }
            changed.len()
        }
        Err(e) => {
            tracing::error!(error = %e, "Reservation sweep failed");
            0
        }
    }
}
