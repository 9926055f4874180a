//! Shared types for the delivery platform
//!
//! Types used by the server and its clients: order commands, events and
//! snapshots, rider and ledger models, relay messages and the unified
//! error system.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::RelayMessage;
