//! Data models
//!
//! Shared between delivery-server and clients (via API).
//! IDs are UUID v4 strings.

pub mod ledger;
pub mod rider;

// Re-exports
pub use ledger::*;
pub use rider::*;
