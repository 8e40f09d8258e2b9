use thiserror::Error;

use crate::db::RepoError;
use crate::orders::{ManagerError, ReconcileError};

/// Startup and lifecycle errors
///
/// Request-level failures use `AppError`; this type covers what can stop
/// the server itself.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    #[error("Order store error: {0}")]
    Orders(#[from] ManagerError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
