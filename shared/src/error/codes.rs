//! Unified error codes for the delivery platform
//!
//! Error codes are shared by the server and every client role
//! (customer app, restaurant console, rider app, admin panel).
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Ledger / payment errors
//! - 6xxx: Rider errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
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
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested status change is not allowed from the current status
    InvalidTransition = 4002,
    /// Order already has a rider
    OrderAlreadyAssigned = 4003,
    /// Order is delivered or cancelled
    OrderTerminal = 4004,
    /// Order has no items
    OrderEmpty = 4005,
    /// Order amounts are inconsistent
    InvalidOrderAmount = 4006,

    // ==================== 5xxx: Ledger ====================
    /// Invalid payment method
    PaymentInvalidMethod = 5001,
    /// Payment has already been refunded
    PaymentAlreadyRefunded = 5002,
    /// Order cannot be refunded
    RefundNotAllowed = 5003,
    /// Rider does not hold enough COD cash
    InsufficientCodBalance = 5004,
    /// Ledger account not found
    LedgerAccountNotFound = 5005,

    // ==================== 6xxx: Rider ====================
    /// Rider not found
    RiderNotFound = 6001,
    /// Rider is not approved
    RiderNotVerified = 6002,
    /// Rider is offline
    RiderOffline = 6003,
    /// Rider already holds an active order
    RiderBusy = 6004,
    /// User already has a rider profile
    RiderAlreadyRegistered = 6005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,

    // Storage (redb)
    /// Disk full
    StorageFull = 9401,
    /// Out of memory
    OutOfMemory = 9402,
    /// Database file corrupted
    StorageCorrupted = 9403,
    /// Storage busy, retry later
    SystemBusy = 9404,
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl ErrorCode {
    /// Numeric value of this code
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default English message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Status change is not allowed",
            ErrorCode::OrderAlreadyAssigned => "Order is already assigned to a rider",
            ErrorCode::OrderTerminal => "Order is already delivered or cancelled",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InvalidOrderAmount => "Order amounts are invalid",

            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentAlreadyRefunded => "Payment has already been refunded",
            ErrorCode::RefundNotAllowed => "Order cannot be refunded",
            ErrorCode::InsufficientCodBalance => "Rider does not hold enough cash",
            ErrorCode::LedgerAccountNotFound => "Ledger account not found",

            ErrorCode::RiderNotFound => "Rider not found",
            ErrorCode::RiderNotVerified => "Rider is not verified",
            ErrorCode::RiderOffline => "Rider is offline",
            ErrorCode::RiderBusy => "Rider already has an active order",
            ErrorCode::RiderAlreadyRegistered => "Rider profile already exists",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageFull => "Storage is full",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::StorageCorrupted => "Storage is corrupted",
            ErrorCode::SystemBusy => "System is busy, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::OrderAlreadyAssigned),
            4004 => Ok(ErrorCode::OrderTerminal),
            4005 => Ok(ErrorCode::OrderEmpty),
            4006 => Ok(ErrorCode::InvalidOrderAmount),

            // Ledger
            5001 => Ok(ErrorCode::PaymentInvalidMethod),
            5002 => Ok(ErrorCode::PaymentAlreadyRefunded),
            5003 => Ok(ErrorCode::RefundNotAllowed),
            5004 => Ok(ErrorCode::InsufficientCodBalance),
            5005 => Ok(ErrorCode::LedgerAccountNotFound),

            // Rider
            6001 => Ok(ErrorCode::RiderNotFound),
            6002 => Ok(ErrorCode::RiderNotVerified),
            6003 => Ok(ErrorCode::RiderOffline),
            6004 => Ok(ErrorCode::RiderBusy),
            6005 => Ok(ErrorCode::RiderAlreadyRegistered),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9402 => Ok(ErrorCode::OutOfMemory),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InvalidTransition.code(), 4002);
        assert_eq!(ErrorCode::OrderAlreadyAssigned.code(), 4003);
        assert_eq!(ErrorCode::RefundNotAllowed.code(), 5003);
        assert_eq!(ErrorCode::RiderBusy.code(), 6004);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::SystemBusy.code(), 9404);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::InvalidTransition));
        assert_eq!(ErrorCode::try_from(6003), Ok(ErrorCode::RiderOffline));
        assert_eq!(ErrorCode::try_from(9403), Ok(ErrorCode::StorageCorrupted));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(3001), Err(InvalidErrorCode(3001)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::RiderBusy).unwrap();
        assert_eq!(json, "6004");

        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::OrderAlreadyAssigned);

        let result: Result<ErrorCode, _> = serde_json::from_str("12");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
        assert_eq!(
            format!("{}", InvalidErrorCode(999)),
            "invalid error code: 999"
        );
    }
}
