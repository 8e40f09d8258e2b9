//! Error handling
//!
//! The error system lives in `shared::error` so clients decode the same
//! codes; handlers return `AppResult<Json<T>>` and errors render through
//! `AppError`'s `IntoResponse`.

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
