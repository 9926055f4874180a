//! redb-based storage layer for orders, riders and the ledger
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Event stream (append-only) |
//! | `snapshots` | `order_id` | `OrderSnapshot` | Snapshot cache |
//! | `active_orders` | `order_id` | `()` | Non-terminal order index |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `sequence_counter` | `&str` | `u64` | Global event / ledger sequences |
//! | `riders` | `rider_id` | `Rider` | Rider profiles |
//! | `rider_by_user` | `user_id` | `rider_id` | One rider profile per user |
//! | `ledger` | `entry key` | `LedgerEntry` | Append-only ledger, keyed for idempotency |
//! | `ledger_index` | `(entity_key, sequence)` | `entry key` | Per-entity statement order |
//! | `accounts` | `entity_key` | `Account` | Cached restaurant / customer balances |
//!
//! Every table lives in one database file so an order transition, the
//! rider update and its ledger postings commit in a single write
//! transaction. redb admits one writer at a time, which serializes
//! competing accepts.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Account, EntityType, LedgerEntry, Rider};
use shared::order::{OrderEvent, OrderSnapshot};
use shared::{AppError, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for storing events: key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Table for storing snapshots: key = order_id, value = JSON-serialized OrderSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Table for tracking non-terminal orders: key = order_id, value = empty
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Table for tracking processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Table for sequence counters: key = "seq" or "ledger_seq", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

/// Table for riders: key = rider_id, value = JSON-serialized Rider
const RIDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("riders");

/// Table mapping user accounts to rider profiles: key = user_id, value = rider_id
const RIDER_BY_USER_TABLE: TableDefinition<&str, &str> = TableDefinition::new("rider_by_user");

/// Table for ledger entries: key = idempotency key, value = JSON-serialized LedgerEntry
const LEDGER_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("ledger");

/// Per-entity ledger index: key = (entity_key, sequence), value = entry key
const LEDGER_INDEX_TABLE: TableDefinition<(&str, u64), &str> =
    TableDefinition::new("ledger_index");

/// Table for restaurant / customer balances: key = entity_key, value = JSON-serialized Account
const ACCOUNTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

const SEQUENCE_KEY: &str = "seq";
const LEDGER_SEQUENCE_KEY: &str = "ledger_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Rider not found: {0}")]
    RiderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {id}"))
            }
            StorageError::RiderNotFound(id) => {
                AppError::with_message(ErrorCode::RiderNotFound, format!("Rider not found: {id}"))
            }
            other => {
                tracing::error!(error = %other, "Storage error");
                AppError::database(other.to_string())
            }
        }
    }
}

/// Ledger index key for an entity
pub fn entity_key(entity_type: EntityType, entity_id: &str) -> String {
    format!("{}:{}", entity_type.as_str(), entity_id)
}

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb uses `Durability::Immediate` by default: a commit is persistent
    /// as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(RIDERS_TABLE)?;
            let _ = write_txn.open_table(RIDER_BY_USER_TABLE)?;
            let _ = write_txn.open_table(LEDGER_TABLE)?;
            let _ = write_txn.open_table(LEDGER_INDEX_TABLE)?;
            let _ = write_txn.open_table(ACCOUNTS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            for key in [SEQUENCE_KEY, LEDGER_SEQUENCE_KEY] {
                if seq_table.get(key)?.is_none() {
                    seq_table.insert(key, 0u64)?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Get the next sequence number (does NOT increment - use within transaction)
    pub fn get_next_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        Ok(current + 1)
    }

    /// Current event sequence as seen by the transaction
    pub fn get_current_sequence_txn(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let table = txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Get current sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set sequence number (within transaction)
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    /// Increment and return the ledger sequence
    pub fn next_ledger_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(LEDGER_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(LEDGER_SEQUENCE_KEY, next)?;
        Ok(next)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }


    // ========== Snapshot Operations ==========

    /// Store a snapshot
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &OrderSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Get a snapshot by order ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    // ========== Active Orders ==========

    /// Mark an order as active
    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Mark an order as inactive
    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Check if an order is active
    pub fn is_order_active(&self, order_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        Ok(table.get(order_id)?.is_some())
    }

    /// Get all active order snapshots (single read transaction)
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        let mut snapshots = Vec::new();
        for result in active_table.iter()? {
            let (key, _value) = result?;
            if let Some(value) = snapshots_table.get(key.value())? {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                snapshots.push(snapshot);
            }
        }

        Ok(snapshots)
    }

    // ========== Rider Operations ==========

    /// Store a rider and keep the user index in step
    pub fn store_rider(&self, txn: &WriteTransaction, rider: &Rider) -> StorageResult<()> {
        {
            let mut table = txn.open_table(RIDERS_TABLE)?;
            let value = serde_json::to_vec(rider)?;
            table.insert(rider.id.as_str(), value.as_slice())?;
        }
        let mut index = txn.open_table(RIDER_BY_USER_TABLE)?;
        index.insert(rider.user_id.as_str(), rider.id.as_str())?;
        Ok(())
    }

    /// Get a rider by ID
    pub fn get_rider(&self, rider_id: &str) -> StorageResult<Option<Rider>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RIDERS_TABLE)?;

        match table.get(rider_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a rider by ID (within transaction)
    pub fn get_rider_txn(
        &self,
        txn: &WriteTransaction,
        rider_id: &str,
    ) -> StorageResult<Option<Rider>> {
        let table = txn.open_table(RIDERS_TABLE)?;

        match table.get(rider_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Rider profile linked to a user account
    pub fn find_rider_id_by_user(&self, user_id: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RIDER_BY_USER_TABLE)?;
        Ok(table.get(user_id)?.map(|guard| guard.value().to_string()))
    }

    /// Rider profile linked to a user account (within transaction)
    pub fn find_rider_id_by_user_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(RIDER_BY_USER_TABLE)?;
        Ok(table.get(user_id)?.map(|guard| guard.value().to_string()))
    }

    // ========== Ledger Operations ==========

    /// Whether an entry with this idempotency key was already posted
    pub fn ledger_entry_exists(&self, txn: &WriteTransaction, key: &str) -> StorageResult<bool> {
        let table = txn.open_table(LEDGER_TABLE)?;
        Ok(table.get(key)?.is_some())
    }

    /// Append a ledger entry (caller checks the key first)
    pub fn append_ledger_entry(
        &self,
        txn: &WriteTransaction,
        entry: &LedgerEntry,
    ) -> StorageResult<()> {
        {
            let mut table = txn.open_table(LEDGER_TABLE)?;
            let value = serde_json::to_vec(entry)?;
            table.insert(entry.key.as_str(), value.as_slice())?;
        }
        let mut index = txn.open_table(LEDGER_INDEX_TABLE)?;
        let owner = entity_key(entry.entity_type, &entry.entity_id);
        index.insert((owner.as_str(), entry.sequence), entry.key.as_str())?;
        Ok(())
    }

    /// Ledger entries of one entity, oldest first
    pub fn get_ledger_entries(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> StorageResult<Vec<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(LEDGER_INDEX_TABLE)?;
        let ledger = read_txn.open_table(LEDGER_TABLE)?;

        let owner = entity_key(entity_type, entity_id);
        let mut entries = Vec::new();
        for result in index.range((owner.as_str(), 0u64)..=(owner.as_str(), u64::MAX))? {
            let (_key, entry_key) = result?;
            if let Some(value) = ledger.get(entry_key.value())? {
                entries.push(serde_json::from_slice::<LedgerEntry>(value.value())?);
            }
        }
        Ok(entries)
    }

    /// Get a cached balance
    pub fn get_account(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> StorageResult<Option<Account>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS_TABLE)?;
        let key = entity_key(entity_type, entity_id);

        match table.get(key.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a cached balance (within transaction)
    pub fn get_account_txn(
        &self,
        txn: &WriteTransaction,
        entity_type: EntityType,
        entity_id: &str,
    ) -> StorageResult<Option<Account>> {
        let table = txn.open_table(ACCOUNTS_TABLE)?;
        let key = entity_key(entity_type, entity_id);

        match table.get(key.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn store_account(&self, txn: &WriteTransaction, account: &Account) -> StorageResult<()> {
        let mut table = txn.open_table(ACCOUNTS_TABLE)?;
        let key = entity_key(account.entity_type, &account.entity_id);
        let value = serde_json::to_vec(account)?;
        table.insert(key.as_str(), value.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Direction, LedgerKind};
    use shared::order::{Actor, ActorRole, EventPayload, OrderEventType, OrderStatus};

    fn create_test_event(order_id: &str, seq: u64) -> OrderEvent {
        let actor = Actor {
            user_id: "user-1".to_string(),
            name: "Test User".to_string(),
            role: ActorRole::Admin,
            restaurant_id: None,
            rider_id: None,
        };
        OrderEvent::new(
            seq,
            order_id.to_string(),
            &actor,
            format!("cmd-{}", seq),
            None,
            OrderEventType::OrderStatusChanged,
            EventPayload::OrderStatusChanged {
                from: OrderStatus::Pending,
                to: OrderStatus::Preparing,
            },
        )
    }

    fn create_test_entry(key: &str, seq: u64, entity_id: &str) -> LedgerEntry {
        LedgerEntry {
            key: key.to_string(),
            sequence: seq,
            entity_type: EntityType::Restaurant,
            entity_id: entity_id.to_string(),
            order_id: None,
            kind: LedgerKind::Settlement,
            amount: 10.0,
            direction: Direction::Credit,
            timestamp: 0,
            balance_after: 10.0 * seq as f64,
            note: None,
        }
    }

    #[test]
    fn test_sequence_set_and_read() {
        let storage = OrderStorage::open_in_memory().unwrap();

        // Initial sequence should be 0
        assert_eq!(storage.get_current_sequence().unwrap(), 0);

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.get_next_sequence(&txn).unwrap(), 1);
        storage.set_sequence(&txn, 5).unwrap();
        assert_eq!(storage.get_current_sequence_txn(&txn).unwrap(), 5);
        txn.commit().unwrap();

        assert_eq!(storage.get_current_sequence().unwrap(), 5);
    }

    #[test]
    fn test_ledger_sequence_independent() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_ledger_sequence(&txn).unwrap(), 1);
        assert_eq!(storage.next_ledger_sequence(&txn).unwrap(), 2);
        txn.commit().unwrap();
        assert_eq!(storage.get_current_sequence().unwrap(), 0);
    }

    #[test]
    fn test_command_idempotency() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let command_id = "cmd-123";

        assert!(!storage.is_command_processed(command_id).unwrap());

        let txn = storage.begin_write().unwrap();
        storage.mark_command_processed(&txn, command_id).unwrap();
        assert!(storage.is_command_processed_txn(&txn, command_id).unwrap());
        txn.commit().unwrap();

        assert!(storage.is_command_processed(command_id).unwrap());
    }

    #[test]
    fn test_event_storage() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order_id = "order-1";

        let txn = storage.begin_write().unwrap();
        storage.store_event(&txn, &create_test_event(order_id, 2)).unwrap();
        storage.store_event(&txn, &create_test_event(order_id, 1)).unwrap();
        storage.store_event(&txn, &create_test_event("order-2", 3)).unwrap();
        txn.commit().unwrap();

        let events = storage.get_events_for_order(order_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);

    }

    #[test]
    fn test_snapshot_and_active_index() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let snapshot = OrderSnapshot::new("order-1".to_string());

        let txn = storage.begin_write().unwrap();
        storage.store_snapshot(&txn, &snapshot).unwrap();
        storage.mark_order_active(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert!(storage.get_snapshot("order-1").unwrap().is_some());
        assert!(storage.is_order_active("order-1").unwrap());
        assert_eq!(storage.get_active_orders().unwrap().len(), 1);

        let txn = storage.begin_write().unwrap();
        storage.mark_order_inactive(&txn, "order-1").unwrap();
        txn.commit().unwrap();

        assert!(!storage.is_order_active("order-1").unwrap());
        assert!(storage.get_active_orders().unwrap().is_empty());
        // Snapshot retained after the order leaves the active index
        assert!(storage.get_snapshot("order-1").unwrap().is_some());
    }

    #[test]
    fn test_rider_storage_and_user_index() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let rider = Rider::new("rider-1".into(), "user-9".into(), "Ali".into(), 1);

        let txn = storage.begin_write().unwrap();
        storage.store_rider(&txn, &rider).unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.get_rider("rider-1").unwrap(), Some(rider));
        assert_eq!(
            storage.find_rider_id_by_user("user-9").unwrap().as_deref(),
            Some("rider-1")
        );
        assert!(storage.find_rider_id_by_user("user-1").unwrap().is_none());
    }

    #[test]
    fn test_ledger_entries_per_entity() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .append_ledger_entry(&txn, &create_test_entry("settlement:a", 1, "rest-1"))
            .unwrap();
        storage
            .append_ledger_entry(&txn, &create_test_entry("settlement:b", 2, "rest-2"))
            .unwrap();
        storage
            .append_ledger_entry(&txn, &create_test_entry("settlement:c", 3, "rest-1"))
            .unwrap();
        assert!(storage.ledger_entry_exists(&txn, "settlement:a").unwrap());
        assert!(!storage.ledger_entry_exists(&txn, "settlement:z").unwrap());
        txn.commit().unwrap();

        let entries = storage
            .get_ledger_entries(EntityType::Restaurant, "rest-1")
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "settlement:a");
        assert_eq!(entries[1].key, "settlement:c");
    }

    #[test]
    fn test_account_storage() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let mut account = Account::new(EntityType::Customer, "cust-1".to_string());
        account.balance = 42.5;

        let txn = storage.begin_write().unwrap();
        storage.store_account(&txn, &account).unwrap();
        txn.commit().unwrap();

        let loaded = storage
            .get_account(EntityType::Customer, "cust-1")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.balance, 42.5);
        assert!(
            storage
                .get_account(EntityType::Restaurant, "cust-1")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delivery.redb");
        {
            let storage = OrderStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            storage.set_sequence(&txn, 9).unwrap();
            txn.commit().unwrap();
        }
        let storage = OrderStorage::open(&path).unwrap();
        assert_eq!(storage.get_current_sequence().unwrap(), 9);
    }
}
