//! Order commands - requests to mutate an order

use super::snapshot::OrderStatus;
use super::types::{Actor, PlaceOrderInput};
use serde::{Deserialize, Serialize};

/// Order command
///
/// `command_id` doubles as the idempotency key: a command id that was
/// already processed is acknowledged without executing again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Acting user
    pub actor: Actor,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(actor: Actor, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            actor,
            payload,
        }
    }

    /// Order targeted by the command (None for checkout)
    pub fn order_id(&self) -> Option<&str> {
        match &self.payload {
            OrderCommandPayload::PlaceOrder { .. } => None,
            OrderCommandPayload::UpdateStatus { order_id, .. }
            | OrderCommandPayload::CancelOrder { order_id, .. }
            | OrderCommandPayload::AcceptOrder { order_id, .. }
            | OrderCommandPayload::RefundOrder { order_id } => Some(order_id),
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Customer checkout
    PlaceOrder { input: PlaceOrderInput },

    /// Move an order to `status`; `distance_km` feeds the rider fare on delivery
    UpdateStatus {
        order_id: String,
        status: OrderStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        distance_km: Option<f64>,
    },

    CancelOrder {
        order_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Rider takes an unassigned order
    AcceptOrder { order_id: String, rider_id: String },

    /// Refund a cancelled prepaid order to the customer wallet
    RefundOrder { order_id: String },
}
