//! Order Event Sourcing Module for the delivery server
//!
//! This module implements order lifecycle management using event sourcing:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **storage**: redb-based persistence for events, snapshots, riders and the ledger
//! - **transitions**: Status stage table and role checks
//! - **side_effects**: Rider and ledger updates driven by events
//! - **dispatch**: Available-order listing for riders
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast       Snapshot + Rider + Ledger
//!                 ↓
//!           RelayWorker → channels
//! ```
//!
//! # Data Flow
//!
//! 1. HTTP handler builds an OrderCommand for the authenticated actor
//! 2. OrdersManager validates and processes command in one write transaction
//! 3. OrderEvent is generated with global sequence
//! 4. Event, snapshot, rider and ledger changes are persisted together
//! 5. Event is broadcast to the relay worker
//! 6. CommandResponse is returned to the handler

pub mod actions;
pub mod appliers;
pub mod dispatch;
pub mod manager;
pub mod money;
pub mod side_effects;
pub mod storage;
pub mod traits;
pub mod transitions;

// Re-exports
pub use dispatch::AvailableOrder;
pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use storage::{OrderStorage, StorageError};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot, OrderStatus,
};
