//! Utilities - error re-exports, logging, business-time helpers

pub mod error;
pub mod logger;
pub mod time;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
