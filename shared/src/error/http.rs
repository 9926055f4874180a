//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::RiderNotFound
            | Self::LedgerAccountNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (retryable: state changed under the caller)
            Self::AlreadyExists
            | Self::OrderAlreadyAssigned
            | Self::RiderBusy
            | Self::RiderOffline
            | Self::RiderAlreadyRegistered
            | Self::PaymentAlreadyRefunded => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::InvalidTransition | Self::OrderTerminal | Self::RefundNotAllowed => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::RiderNotVerified => StatusCode::FORBIDDEN,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError | Self::SystemBusy | Self::StorageFull | Self::OutOfMemory => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
