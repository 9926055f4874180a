//! Core traits for the action/applier architecture
//!
//! - [`CommandHandler`]: validates a command against current state and emits events
//! - [`EventApplier`]: folds an event into an [`OrderSnapshot`] (pure)
//! - [`CommandContext`]: per-command view of the write transaction

use std::collections::HashMap;

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::models::Rider;
use shared::order::types::CommandErrorCode;
use shared::order::{Actor, OrderEvent, OrderSnapshot, OrderStatus};
use thiserror::Error;

use super::storage::{OrderStorage, StorageError};
// The EventApplier impl for EventAction may expand at the trait definition
#[allow(unused_imports)]
use super::appliers::{
    EventAction, OrderCancelledApplier, OrderDeliveredApplier, OrderPlacedApplier,
    OrderRefundedApplier, RiderAssignedApplier, StatusChangedApplier,
};

/// Errors raised while executing an action
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Rider not found: {0}")]
    RiderNotFound(String),

    #[error("Invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        reason: String,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// State changed under the caller (assignment races, busy rider)
    #[error("{1}")]
    Conflict(CommandErrorCode, String),

    #[error("{1}")]
    InvalidOperation(CommandErrorCode, String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderNotFound(id) => OrderError::OrderNotFound(id),
            StorageError::RiderNotFound(id) => OrderError::RiderNotFound(id),
            other => OrderError::Storage(other.to_string()),
        }
    }
}

/// Metadata carried from the command into every event it produces
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor: Actor,
    /// Client timestamp
    pub timestamp: i64,
}

impl CommandMetadata {
    /// Build an event stamped with this command's actor and id
    pub fn event(
        &self,
        sequence: u64,
        order_id: &str,
        event_type: shared::order::OrderEventType,
        payload: shared::order::EventPayload,
    ) -> OrderEvent {
        OrderEvent::new(
            sequence,
            order_id.to_string(),
            &self.actor,
            self.command_id.clone(),
            Some(self.timestamp),
            event_type,
            payload,
        )
    }
}

/// Command handler - validates and produces events
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier - pure state transition
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}

/// Execution context for one command
///
/// Snapshots are cached and flushed by the manager after all events are
/// applied. Rider records are read and written straight through the
/// transaction so that ledger postings always see the latest balances.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    snapshots: HashMap<String, OrderSnapshot>,
    modified: Vec<String>,
    sequence: u64,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            snapshots: HashMap::new(),
            modified: Vec::new(),
            sequence: current_sequence,
        }
    }

    pub fn txn(&self) -> &'a WriteTransaction {
        self.txn
    }

    pub fn storage(&self) -> &'a OrderStorage {
        self.storage
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Highest sequence allocated so far
    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    // ========== Snapshots ==========

    /// Load a snapshot (cache first, then the transaction)
    pub fn load_snapshot(&mut self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.snapshots.get(order_id) {
            return Ok(snapshot.clone());
        }
        let snapshot = self
            .storage
            .get_snapshot_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        self.snapshots
            .insert(order_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    /// Fresh snapshot for a new order
    pub fn create_snapshot(&self, order_id: String) -> OrderSnapshot {
        OrderSnapshot::new(order_id)
    }

    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        if !self.modified.contains(&snapshot.order_id) {
            self.modified.push(snapshot.order_id.clone());
        }
        self.snapshots.insert(snapshot.order_id.clone(), snapshot);
    }

    /// Snapshots changed by this command, in first-modified order
    pub fn modified_snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.modified
            .iter()
            .filter_map(|order_id| self.snapshots.get(order_id))
    }

    // ========== Riders ==========

    pub fn load_rider(&self, rider_id: &str) -> Result<Rider, OrderError> {
        self.storage
            .get_rider_txn(self.txn, rider_id)?
            .ok_or_else(|| OrderError::RiderNotFound(rider_id.to_string()))
    }

    pub fn find_rider(&self, rider_id: &str) -> Result<Option<Rider>, OrderError> {
        Ok(self.storage.get_rider_txn(self.txn, rider_id)?)
    }

    pub fn save_rider(&self, rider: &Rider) -> Result<(), OrderError> {
        Ok(self.storage.store_rider(self.txn, rider)?)
    }

    /// Whether `order_id` refers to an order that still needs its rider
    pub fn is_order_open(&mut self, order_id: &str) -> Result<bool, OrderError> {
        match self.load_snapshot(order_id) {
            Ok(snapshot) => Ok(!snapshot.is_terminal()),
            Err(OrderError::OrderNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_allocation() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 41);
        assert_eq!(ctx.next_sequence(), 42);
        assert_eq!(ctx.next_sequence(), 43);
        assert_eq!(ctx.current_sequence(), 43);
    }

    #[test]
    fn test_load_missing_snapshot() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        assert!(matches!(
            ctx.load_snapshot("nope"),
            Err(OrderError::OrderNotFound(_))
        ));
        assert!(!ctx.is_order_open("nope").unwrap());
    }

    #[test]
    fn test_saved_snapshot_visible_before_flush() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let mut snapshot = ctx.create_snapshot("order-1".to_string());
        snapshot.status = OrderStatus::Preparing;
        ctx.save_snapshot(snapshot);

        assert_eq!(
            ctx.load_snapshot("order-1").unwrap().status,
            OrderStatus::Preparing
        );
        assert_eq!(ctx.modified_snapshots().count(), 1);
    }

    #[test]
    fn test_rider_write_through() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let ctx = CommandContext::new(&txn, &storage, 0);

        assert!(matches!(
            ctx.load_rider("rider-1"),
            Err(OrderError::RiderNotFound(_))
        ));

        let mut rider = Rider::new("rider-1".into(), "user-1".into(), "Ali".into(), 0);
        rider.online = true;
        ctx.save_rider(&rider).unwrap();
        assert!(ctx.load_rider("rider-1").unwrap().online);
    }
}
