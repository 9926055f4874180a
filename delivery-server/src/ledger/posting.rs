//! Ledger posting
//!
//! Appends one entry and moves the matching cached balance inside the
//! caller's write transaction. An entry whose key already exists is skipped,
//! so replaying a financial event never books it twice.

use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::models::{Account, Direction, EntityType, LedgerEntry, LedgerKind};
use shared::order::types::CommandErrorCode;
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::orders::money::{to_decimal, to_f64};
use crate::orders::storage::{OrderStorage, StorageError};
use crate::orders::traits::OrderError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Rider not found: {0}")]
    RiderNotFound(String),

    #[error("Insufficient COD balance: held {held}, requested {requested}")]
    InsufficientCod { held: f64, requested: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

impl From<LedgerError> for OrderError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Storage(e) => e.into(),
            LedgerError::RiderNotFound(id) => OrderError::RiderNotFound(id),
            other => {
                OrderError::InvalidOperation(CommandErrorCode::ValidationFailed, other.to_string())
            }
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Storage(e) => e.into(),
            LedgerError::RiderNotFound(id) => {
                AppError::with_message(ErrorCode::RiderNotFound, format!("Rider not found: {id}"))
            }
            e @ LedgerError::InsufficientCod { .. } => {
                AppError::with_message(ErrorCode::InsufficientCodBalance, e.to_string())
            }
            e @ LedgerError::InvalidAmount(_) => AppError::validation(e.to_string()),
        }
    }
}

/// A money movement to book
#[derive(Debug, Clone)]
pub struct Posting {
    /// Idempotency key
    pub key: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub order_id: Option<String>,
    pub kind: LedgerKind,
    pub amount: f64,
    pub direction: Direction,
    pub timestamp: i64,
    pub note: Option<String>,
}

/// Book `posting`; returns `None` when its key was already booked
pub fn post_entry(
    storage: &OrderStorage,
    txn: &WriteTransaction,
    posting: Posting,
) -> Result<Option<LedgerEntry>, LedgerError> {
    if !posting.amount.is_finite() || posting.amount <= 0.0 {
        return Err(LedgerError::InvalidAmount(posting.amount));
    }
    if storage.ledger_entry_exists(txn, &posting.key)? {
        tracing::debug!(key = %posting.key, "Ledger entry already booked, skipping");
        return Ok(None);
    }

    let delta = to_decimal(posting.direction.signed(posting.amount));
    let balance_after = match posting.entity_type {
        EntityType::Rider => {
            let mut rider = storage
                .get_rider_txn(txn, &posting.entity_id)?
                .ok_or_else(|| LedgerError::RiderNotFound(posting.entity_id.clone()))?;
            let balance = if posting.kind.affects_cod() {
                let held = to_decimal(rider.cod_held) + delta;
                if held < Decimal::ZERO {
                    return Err(LedgerError::InsufficientCod {
                        held: rider.cod_held,
                        requested: posting.amount,
                    });
                }
                rider.cod_held = to_f64(held);
                rider.cod_held
            } else {
                rider.wallet_balance = to_f64(to_decimal(rider.wallet_balance) + delta);
                rider.wallet_balance
            };
            rider.updated_at = posting.timestamp;
            storage.store_rider(txn, &rider)?;
            balance
        }
        EntityType::Restaurant | EntityType::Customer => {
            let mut account = storage
                .get_account_txn(txn, posting.entity_type, &posting.entity_id)?
                .unwrap_or_else(|| Account::new(posting.entity_type, posting.entity_id.clone()));
            account.balance = to_f64(to_decimal(account.balance) + delta);
            account.updated_at = posting.timestamp;
            storage.store_account(txn, &account)?;
            account.balance
        }
    };

    let entry = LedgerEntry {
        key: posting.key,
        sequence: storage.next_ledger_sequence(txn)?,
        entity_type: posting.entity_type,
        entity_id: posting.entity_id,
        order_id: posting.order_id,
        kind: posting.kind,
        amount: posting.amount,
        direction: posting.direction,
        timestamp: posting.timestamp,
        balance_after,
        note: posting.note,
    };
    storage.append_ledger_entry(txn, &entry)?;

    tracing::info!(
        key = %entry.key,
        entity_type = %entry.entity_type,
        entity_id = %entry.entity_id,
        amount = entry.amount,
        balance_after = entry.balance_after,
        "Ledger entry booked"
    );
    Ok(Some(entry))
}
