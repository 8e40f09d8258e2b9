//! Unified error codes for the Thali POS
//!
//! Error codes are shared by the server and every client and are organized by
//! category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant errors (franchise / location)
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    NotAuthenticated = 1001,
    InvalidCredentials = 1002,
    TokenExpired = 1003,
    TokenInvalid = 1004,
    /// Account exists but has not been approved by an admin yet
    AccountPendingApproval = 1005,
    AccountDisabled = 1007,
    EmailAlreadyRegistered = 1008,

    // ==================== 2xxx: Permission ====================
    PermissionDenied = 2001,
    RoleRequired = 2002,
    AdminRequired = 2003,
    /// Resource belongs to a franchise or location the caller cannot see
    OutsideTenantScope = 2004,

    // ==================== 3xxx: Tenant ====================
    FranchiseNotFound = 3001,
    LocationNotFound = 3002,
    FranchiseInactive = 3003,
    LocationHasActiveOrders = 3004,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    OrderAlreadySettled = 4002,
    OrderAlreadyCancelled = 4003,
    OrderEmpty = 4004,
    OrderItemNotFound = 4005,
    InvalidOrderTransition = 4006,
    PendingRecordExists = 4007,
    PendingRecordNotFound = 4008,
    DuplicateCommand = 4009,
    CouponNotFound = 4010,
    CouponInactive = 4011,
    CouponNotApplicable = 4012,
    InvalidQuantity = 4013,

    // ==================== 5xxx: Payment ====================
    PaymentInsufficientAmount = 5001,
    PaymentInvalidMethod = 5002,
    PaymentInvalidAmount = 5003,

    // ==================== 6xxx: Menu ====================
    MenuItemNotFound = 6001,
    CategoryNotFound = 6002,
    MenuItemUnavailable = 6003,
    CategoryNameExists = 6004,
    CategoryHasItems = 6005,
    InvalidPrice = 6006,

    // ==================== 7xxx: Table ====================
    TableNotFound = 7001,
    TableOccupied = 7002,
    TableReserved = 7003,
    TableNumberExists = 7004,
    /// Table is referenced by a non-terminal order and cannot be changed
    TableInUse = 7005,

    // ==================== 8xxx: User ====================
    UserNotFound = 8001,
    CannotModifySelf = 8002,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9003,
    NetworkError = 9004,
    TimeoutError = 9005,
    PrinterNotAvailable = 9101,
    PrintFailed = 9102,
    StorageFull = 9401,
    OutOfMemory = 9402,
    StorageCorrupted = 9403,
    SystemBusy = 9404,
    FileTooLarge = 9501,
    UnsupportedFileType = 9502,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default English message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid email or password",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",
            Self::AccountPendingApproval => "Account is awaiting approval",
            Self::AccountDisabled => "Account is disabled",
            Self::EmailAlreadyRegistered => "Email is already registered",

            Self::PermissionDenied => "Permission denied",
            Self::RoleRequired => "Role required",
            Self::AdminRequired => "Admin role required",
            Self::OutsideTenantScope => "Resource is outside your franchise or location",

            Self::FranchiseNotFound => "Franchise not found",
            Self::LocationNotFound => "Location not found",
            Self::FranchiseInactive => "Franchise is inactive",
            Self::LocationHasActiveOrders => "Location has active orders",

            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadySettled => "Order already settled",
            Self::OrderAlreadyCancelled => "Order already cancelled",
            Self::OrderEmpty => "Order has no items",
            Self::OrderItemNotFound => "Order item not found",
            Self::InvalidOrderTransition => "Operation not allowed in the current order status",
            Self::PendingRecordExists => "Order is already waiting for a manager",
            Self::PendingRecordNotFound => "Manager-pending record not found",
            Self::DuplicateCommand => "Command already processed",
            Self::CouponNotFound => "Coupon not found",
            Self::CouponInactive => "Coupon is inactive",
            Self::CouponNotApplicable => "Coupon does not match any item in the order",
            Self::InvalidQuantity => "Invalid quantity",

            Self::PaymentInsufficientAmount => "Tendered amount is less than the order total",
            Self::PaymentInvalidMethod => "Invalid payment method",
            Self::PaymentInvalidAmount => "Invalid payment amount",

            Self::MenuItemNotFound => "Menu item not found",
            Self::CategoryNotFound => "Category not found",
            Self::MenuItemUnavailable => "Menu item is unavailable",
            Self::CategoryNameExists => "Category name already exists",
            Self::CategoryHasItems => "Category still has menu items",
            Self::InvalidPrice => "Invalid price",

            Self::TableNotFound => "Table not found",
            Self::TableOccupied => "Table is occupied",
            Self::TableReserved => "Table is reserved",
            Self::TableNumberExists => "Table number already exists",
            Self::TableInUse => "Table is referenced by an open order",

            Self::UserNotFound => "User not found",
            Self::CannotModifySelf => "Cannot change your own role or status",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::NetworkError => "Network error",
            Self::TimeoutError => "Operation timed out",
            Self::PrinterNotAvailable => "Printer not available",
            Self::PrintFailed => "Print failed",
            Self::StorageFull => "Storage is full",
            Self::OutOfMemory => "Out of memory",
            Self::StorageCorrupted => "Storage is corrupted",
            Self::SystemBusy => "System busy, please retry",
            Self::FileTooLarge => "File too large",
            Self::UnsupportedFileType => "Unsupported file type",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Returned when a u16 does not map to any [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1005 => Self::AccountPendingApproval,
            1007 => Self::AccountDisabled,
            1008 => Self::EmailAlreadyRegistered,

            2001 => Self::PermissionDenied,
            2002 => Self::RoleRequired,
            2003 => Self::AdminRequired,
            2004 => Self::OutsideTenantScope,

            3001 => Self::FranchiseNotFound,
            3002 => Self::LocationNotFound,
            3003 => Self::FranchiseInactive,
            3004 => Self::LocationHasActiveOrders,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderAlreadySettled,
            4003 => Self::OrderAlreadyCancelled,
            4004 => Self::OrderEmpty,
            4005 => Self::OrderItemNotFound,
            4006 => Self::InvalidOrderTransition,
            4007 => Self::PendingRecordExists,
            4008 => Self::PendingRecordNotFound,
            4009 => Self::DuplicateCommand,
            4010 => Self::CouponNotFound,
            4011 => Self::CouponInactive,
            4012 => Self::CouponNotApplicable,
            4013 => Self::InvalidQuantity,

            5001 => Self::PaymentInsufficientAmount,
            5002 => Self::PaymentInvalidMethod,
            5003 => Self::PaymentInvalidAmount,

            6001 => Self::MenuItemNotFound,
            6002 => Self::CategoryNotFound,
            6003 => Self::MenuItemUnavailable,
            6004 => Self::CategoryNameExists,
            6005 => Self::CategoryHasItems,
            6006 => Self::InvalidPrice,

            7001 => Self::TableNotFound,
            7002 => Self::TableOccupied,
            7003 => Self::TableReserved,
            7004 => Self::TableNumberExists,
            7005 => Self::TableInUse,

            8001 => Self::UserNotFound,
            8002 => Self::CannotModifySelf,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,
            9004 => Self::NetworkError,
            9005 => Self::TimeoutError,
            9101 => Self::PrinterNotAvailable,
            9102 => Self::PrintFailed,
            9401 => Self::StorageFull,
            9402 => Self::OutOfMemory,
            9403 => Self::StorageCorrupted,
            9404 => Self::SystemBusy,
            9501 => Self::FileTooLarge,
            9502 => Self::UnsupportedFileType,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::PendingRecordExists.code(), 4007);
        assert_eq!(ErrorCode::TableOccupied.code(), 7002);
        assert_eq!(ErrorCode::SystemBusy.code(), 9404);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::OrderAlreadySettled));
        assert_eq!(ErrorCode::try_from(5001), Ok(ErrorCode::PaymentInsufficientAmount));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(1006), Err(InvalidErrorCode(1006)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::CouponNotApplicable).unwrap();
        assert_eq!(json, "4012");
        let code: ErrorCode = serde_json::from_str("7001").unwrap();
        assert_eq!(code, ErrorCode::TableNotFound);
        assert!(serde_json::from_str::<ErrorCode>("4999").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::OrderNotFound.to_string(), "E4001");
    }
}
