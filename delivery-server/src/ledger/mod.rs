//! Wallet / ledger updater
//!
//! Order-driven entries (delivery earnings, COD, refunds) are booked by the
//! order side effects inside the command transaction. This service covers the
//! admin-driven movements and the statement query:
//!
//! - manual settlement, keyed by account and reference
//! - COD remittance from a rider, keyed by rider and reference
//!
//! Every booking goes through [`posting::post_entry`], so an already used key
//! is never booked twice.

pub mod posting;

use std::sync::Arc;

use shared::models::{
    CodRemittance, Direction, EntityType, LedgerEntry, LedgerKind, LedgerStatement, Rider,
    SettlementCreate, reference_entry_key,
};
use shared::util::now_millis;

pub use posting::{LedgerError, Posting, post_entry};

use crate::message::{MessageBus, wallet_message};
use crate::orders::OrdersManager;
use crate::orders::money::{to_decimal, to_f64};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_positive_amount,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct LedgerService {
    orders: Arc<OrdersManager>,
    bus: MessageBus,
}

impl LedgerService {
    pub fn new(orders: Arc<OrdersManager>, bus: MessageBus) -> Self {
        Self { orders, bus }
    }

    /// Entries and balances of one entity, oldest entry first
    pub fn statement(&self, entity_type: EntityType, entity_id: &str) -> AppResult<LedgerStatement> {
        let storage = self.orders.storage();
        let (balance, cod_held) = match entity_type {
            EntityType::Rider => {
                let rider = storage
                    .get_rider(entity_id)?
                    .ok_or_else(|| LedgerError::RiderNotFound(entity_id.to_string()))?;
                (rider.wallet_balance, Some(rider.cod_held))
            }
            EntityType::Restaurant | EntityType::Customer => {
                let balance = storage
                    .get_account(entity_type, entity_id)?
                    .map(|account| account.balance)
                    .unwrap_or(0.0);
                (balance, None)
            }
        };

        Ok(LedgerStatement {
            entity_type,
            entity_id: entity_id.to_string(),
            balance,
            cod_held,
            entries: storage.get_ledger_entries(entity_type, entity_id)?,
        })
    }

    /// Book a manual settlement
    ///
    /// A reference that was already used is rejected with a conflict.
    pub fn settle(&self, input: SettlementCreate) -> AppResult<LedgerEntry> {
        validate_required_text(&input.entity_id, "entityId", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&input.reference, "reference", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&input.note, "note", MAX_NOTE_LEN)?;
        validate_positive_amount(input.amount, "amount")?;

        let posting = Posting {
            key: reference_entry_key(
                LedgerKind::Settlement,
                input.entity_type,
                &input.entity_id,
                &input.reference,
            ),
            entity_type: input.entity_type,
            entity_id: input.entity_id,
            order_id: None,
            kind: LedgerKind::Settlement,
            amount: to_f64(to_decimal(input.amount)),
            direction: input.direction,
            timestamp: now_millis(),
            note: input.note,
        };
        let entry = self.book_once(posting)?;

        tracing::info!(
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            reference = %input.reference,
            amount = entry.amount,
            "Manual settlement booked"
        );
        Ok(entry)
    }

    /// Record cash handed over by a rider; `codHeld` may not go below zero
    pub fn remit_cod(&self, rider_id: &str, input: CodRemittance) -> AppResult<Rider> {
        validate_required_text(&input.reference, "reference", MAX_SHORT_TEXT_LEN)?;
        validate_positive_amount(input.amount, "amount")?;

        let posting = Posting {
            key: reference_entry_key(
                LedgerKind::CodRemittance,
                EntityType::Rider,
                rider_id,
                &input.reference,
            ),
            entity_type: EntityType::Rider,
            entity_id: rider_id.to_string(),
            order_id: None,
            kind: LedgerKind::CodRemittance,
            amount: to_f64(to_decimal(input.amount)),
            direction: Direction::Debit,
            timestamp: now_millis(),
            note: Some(format!("COD remittance {}", input.reference)),
        };
        let entry = self.book_once(posting)?;

        tracing::info!(
            rider_id = %rider_id,
            reference = %input.reference,
            amount = entry.amount,
            cod_held = entry.balance_after,
            "COD remittance booked"
        );
        self.orders
            .storage()
            .get_rider(rider_id)?
            .ok_or_else(|| LedgerError::RiderNotFound(rider_id.to_string()).into())
    }

    /// Post in its own transaction, reject a reused key, notify the owner
    fn book_once(&self, posting: Posting) -> AppResult<LedgerEntry> {
        let storage = self.orders.storage();
        let key = posting.key.clone();

        let txn = storage.begin_write()?;
        let entry = post_entry(storage, &txn, posting)?.ok_or_else(|| {
            AppError::conflict(format!("Ledger reference already booked: {}", key))
        })?;
        txn.commit().map_err(crate::orders::StorageError::from)?;

        self.bus.publish(wallet_message(&entry));
        Ok(entry)
    }
}
