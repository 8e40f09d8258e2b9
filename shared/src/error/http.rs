//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::FranchiseNotFound
            | Self::LocationNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::PendingRecordNotFound
            | Self::CouponNotFound
            | Self::MenuItemNotFound
            | Self::CategoryNotFound
            | Self::TableNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::OrderAlreadySettled
            | Self::OrderAlreadyCancelled
            | Self::PendingRecordExists
            | Self::DuplicateCommand
            | Self::InvalidOrderTransition
            | Self::LocationHasActiveOrders
            | Self::CategoryNameExists
            | Self::CategoryHasItems
            | Self::TableOccupied
            | Self::TableReserved
            | Self::TableNumberExists
            | Self::TableInUse => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::OutsideTenantScope
            | Self::AccountPendingApproval
            | Self::AccountDisabled
            | Self::FranchiseInactive
            | Self::CannotModifySelf => StatusCode::FORBIDDEN,

            // 402 Payment Required
            Self::PaymentInsufficientAmount => StatusCode::PAYMENT_REQUIRED,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 415 Unsupported Media Type
            Self::UnsupportedFileType => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            // 503 Service Unavailable (transient, client can retry)
            Self::NetworkError | Self::TimeoutError | Self::SystemBusy => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::PrinterNotAvailable
            | Self::PrintFailed
            | Self::StorageFull
            | Self::OutOfMemory
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
