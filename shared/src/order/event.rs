//! Order events - immutable facts recorded after command processing

use super::snapshot::OrderStatus;
use super::types::{
    Actor, ActorRole, DeliveryInfo, DeliverySettlement, OrderItem, OrderPricing, PaymentMethod,
    PaymentStatus,
};
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - AUTHORITATIVE for state evolution
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// User who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    pub operator_role: ActorRole,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderPlaced,
    OrderStatusChanged,
    RiderAssigned,
    OrderDelivered,
    OrderCancelled,
    OrderRefunded,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderPlaced => write!(f, "ORDER_PLACED"),
            OrderEventType::OrderStatusChanged => write!(f, "ORDER_STATUS_CHANGED"),
            OrderEventType::RiderAssigned => write!(f, "RIDER_ASSIGNED"),
            OrderEventType::OrderDelivered => write!(f, "ORDER_DELIVERED"),
            OrderEventType::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            OrderEventType::OrderRefunded => write!(f, "ORDER_REFUNDED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderPlaced {
        customer_id: String,
        restaurant_id: String,
        /// Complete item snapshots with line totals
        items: Vec<OrderItem>,
        pricing: OrderPricing,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        delivery: DeliveryInfo,
    },

    OrderStatusChanged {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// `to` equals `from` when the order was already past Pending
    RiderAssigned {
        rider_id: String,
        rider_name: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    OrderDelivered {
        from: OrderStatus,
        settlement: DeliverySettlement,
    },

    OrderCancelled {
        from: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Rider released by the cancellation
        #[serde(skip_serializing_if = "Option::is_none")]
        rider_id: Option<String>,
    },

    OrderRefunded {
        customer_id: String,
        amount: f64,
    },
}

impl OrderEvent {
    /// Create a new event
    ///
    /// # Arguments
    /// * `sequence` - Global sequence number (authoritative ordering)
    /// * `order_id` - Order this event belongs to
    /// * `actor` - User who triggered this event
    /// * `command_id` - Command that triggered this event
    /// * `client_timestamp` - Client-provided timestamp (for audit, may have clock skew)
    /// * `event_type` - Event type
    /// * `payload` - Event payload
    pub fn new(
        sequence: u64,
        order_id: String,
        actor: &Actor,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            // Server timestamp is ALWAYS set by server
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_timestamp,
            operator_id: actor.user_id.clone(),
            operator_name: actor.name.clone(),
            operator_role: actor.role,
            command_id,
            event_type,
            payload,
        }
    }

    /// Status the order had before this event, if the event moved it
    pub fn status_change(&self) -> Option<(OrderStatus, OrderStatus)> {
        match &self.payload {
            EventPayload::OrderStatusChanged { from, to }
            | EventPayload::RiderAssigned { from, to, .. } => Some((*from, *to)),
            EventPayload::OrderDelivered { from, .. } => Some((*from, OrderStatus::Delivered)),
            EventPayload::OrderCancelled { from, .. } => Some((*from, OrderStatus::Cancelled)),
            EventPayload::OrderPlaced { .. } | EventPayload::OrderRefunded { .. } => None,
        }
    }
}
