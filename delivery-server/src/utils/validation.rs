//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use shared::order::types::CommandErrorCode;

use crate::orders::traits::OrderError;
use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: dish, rider, bank
pub const MAX_NAME_LEN: usize = 200;

/// Notes and reasons (cancel reason, settlement note, delivery instructions)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: ids, references, account numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (HTTP handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a latitude/longitude pair
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), AppError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::validation(format!("lat out of range: {lat}")));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::validation(format!("lng out of range: {lng}")));
    }
    Ok(())
}

/// Validate a positive, finite amount
pub fn validate_positive_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

// ── Validation helpers (Order actions) ──────────────────────────────

/// Validate a required string for order actions (non-empty + max length).
pub fn validate_order_text(value: &str, field: &str, max_len: usize) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::InvalidOperation(
            CommandErrorCode::ValidationFailed,
            format!("{field} must not be empty"),
        ));
    }
    if value.len() > max_len {
        return Err(OrderError::InvalidOperation(
            CommandErrorCode::ValidationFailed,
            format!("{field} is too long ({} chars, max {max_len})", value.len()),
        ));
    }
    Ok(())
}

/// Validate an optional string for order actions (max length).
pub fn validate_order_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), OrderError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(OrderError::InvalidOperation(
            CommandErrorCode::ValidationFailed,
            format!("{field} is too long ({} chars, max {max_len})", v.len()),
        ));
    }
    Ok(())
}
