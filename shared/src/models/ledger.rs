//! Ledger Model
//!
//! Append-only money movements plus cached per-entity balances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger entity type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Restaurant,
    Rider,
    Customer,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Restaurant => "restaurant",
            EntityType::Rider => "rider",
            EntityType::Customer => "customer",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restaurant" => Ok(EntityType::Restaurant),
            "rider" => Ok(EntityType::Rider),
            "customer" => Ok(EntityType::Customer),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    /// Signed amount applied to a balance
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Direction::Credit => amount,
            Direction::Debit => -amount,
        }
    }
}

/// What caused a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Net rider earning on delivery
    DeliveryEarning,
    /// Restaurant share of COD cash
    CodSale,
    /// Cash the rider now holds for a COD order
    CodCollected,
    CodRemittance,
    Refund,
    Settlement,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::DeliveryEarning => "delivery_earning",
            LedgerKind::CodSale => "cod_sale",
            LedgerKind::CodCollected => "cod_collected",
            LedgerKind::CodRemittance => "cod_remittance",
            LedgerKind::Refund => "refund",
            LedgerKind::Settlement => "settlement",
        }
    }

    /// Entries of this kind move `codHeld` instead of the wallet balance
    pub fn affects_cod(&self) -> bool {
        matches!(self, LedgerKind::CodCollected | LedgerKind::CodRemittance)
    }
}

/// Idempotency key of an order-driven entry
pub fn order_entry_key(order_id: &str, kind: LedgerKind, entity_type: EntityType) -> String {
    format!("{}:{}:{}", order_id, kind.as_str(), entity_type.as_str())
}

/// Idempotency key of a manual entry, scoped to the account it moves
pub fn reference_entry_key(
    kind: LedgerKind,
    entity_type: EntityType,
    entity_id: &str,
    reference: &str,
) -> String {
    format!(
        "{}:{}:{}:{}",
        kind.as_str(),
        entity_type.as_str(),
        entity_id,
        reference
    )
}

/// Ledger entry (流水)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Idempotency key
    pub key: String,
    pub sequence: u64,
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub kind: LedgerKind,
    pub amount: f64,
    pub direction: Direction,
    pub timestamp: i64,
    /// Balance of the affected bucket after this entry
    pub balance_after: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Cached balance for restaurants and customers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub balance: f64,
    pub updated_at: i64,
}

impl Account {
    pub fn new(entity_type: EntityType, entity_id: String) -> Self {
        Self {
            entity_type,
            entity_id,
            balance: 0.0,
            updated_at: 0,
        }
    }
}

/// Manual settlement payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementCreate {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub amount: f64,
    pub direction: Direction,
    pub reference: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Ledger query result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatement {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub balance: f64,
    /// Riders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod_held: Option<f64>,
    pub entries: Vec<LedgerEntry>,
}
