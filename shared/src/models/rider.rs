//! Rider Model

use crate::order::GeoPoint;
use serde::{Deserialize, Serialize};

/// Rider verification status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    NotStarted,
    Pending,
    Approved,
    Rejected,
}

/// Bank payout details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_title: String,
    pub account_number: String,
    pub bank_name: String,
}

/// Rider profile (骑手)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub id: String,
    /// Linked user account
    pub user_id: String,
    pub name: String,
    pub verification: VerificationStatus,
    pub online: bool,
    /// At most one non-terminal order
    #[serde(default)]
    pub current_order: Option<String>,
    pub wallet_balance: f64,
    /// Cash collected on COD orders not yet remitted
    pub cod_held: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_updated_at: Option<i64>,
    #[serde(default)]
    pub completed_deliveries: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Rider {
    pub fn new(id: String, user_id: String, name: String, now: i64) -> Self {
        Self {
            id,
            user_id,
            name,
            verification: VerificationStatus::NotStarted,
            online: false,
            current_order: None,
            wallet_balance: 0.0,
            cod_held: 0.0,
            bank_details: None,
            location: None,
            location_updated_at: None,
            completed_deliveries: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.verification == VerificationStatus::Approved
    }

    pub fn is_busy(&self) -> bool {
        self.current_order.is_some()
    }
}

/// Register rider payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderCreate {
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
}

/// Verification update payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderVerificationUpdate {
    pub status: VerificationStatus,
}

/// Online toggle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderOnlineUpdate {
    pub online: bool,
}

/// COD remittance payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodRemittance {
    pub amount: f64,
    pub reference: String,
}
