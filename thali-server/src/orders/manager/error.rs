use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::error::{AppError, ErrorCode};
use shared::order::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Outside tenant scope: {0}")]
    OutsideTenantScope(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map a storage failure to an error code (clients localize by code)
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return CommandErrorCode::OrderNotFound,
        _ => {}
    }

    // redb errors only carry their meaning in the message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }
    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Storage/Commit errors
    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::Order(OrderError::Storage(msg)) => {
                tracing::error!(error = %msg, "Storage error inside command");
                (CommandErrorCode::InternalError, msg)
            }
            ManagerError::Order(e) => (e.code(), e.to_string()),
            ManagerError::PermissionDenied(msg) => (CommandErrorCode::PermissionDenied, msg),
            ManagerError::OutsideTenantScope(msg) => (CommandErrorCode::OutsideTenantScope, msg),
            ManagerError::OrderNotFound(id) => (
                CommandErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<redb::CommitError> for ManagerError {
    fn from(err: redb::CommitError) -> Self {
        ManagerError::Storage(StorageError::from(err))
    }
}

/// Query failures seen by HTTP handlers
impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
            }
            ManagerError::PermissionDenied(msg) => AppError::forbidden(msg),
            ManagerError::OutsideTenantScope(msg) => AppError::out_of_scope(msg),
            other => {
                tracing::error!(error = %other, "Order storage query failed");
                AppError::database(other.to_string())
            }
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
