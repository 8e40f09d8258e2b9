//! Repository Module
//!
//! CRUD over the redb document collections. Repositories own the tenant
//! rules that only need the collection itself (unique table numbers,
//! unique coupon codes, category in use); scope checks live in the API.

// Tenant
pub mod franchise;
pub mod location;
pub mod user;

// Catalog
pub mod category;
pub mod coupon;
pub mod menu_item;

// Floor
pub mod dining_table;

// Re-exports
pub use category::CategoryRepository;
pub use coupon::CouponRepository;
pub use dining_table::DiningTableRepository;
pub use franchise::FranchiseRepository;
pub use location::LocationRepository;
pub use menu_item::MenuItemRepository;
pub use user::{UserRecord, UserRepository};

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A business rule refused the change
    #[error("{1}")]
    Rejected(ErrorCode, String),
}

macro_rules! db_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RepoError {
                fn from(err: $ty) -> Self {
                    RepoError::Database(err.to_string())
                }
            }
        )*
    };
}

db_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
    serde_json::Error,
);

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Rejected(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
