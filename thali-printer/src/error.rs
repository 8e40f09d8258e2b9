//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// Printer address missing or malformed
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
