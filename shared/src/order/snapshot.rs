//! Order snapshot - computed state from event stream
//!
//! The snapshot includes a `state_checksum` field for drift detection.
//! Clients can compare their locally computed checksum with the server's
//! to detect if the reducer logic has diverged.

use super::types::{DeliveryInfo, OrderItem, PaymentMethod, PaymentStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Order status
///
/// The serialized names are the persisted strings; several of them carry
/// spaces ("Ready for Pickup", "Picked Up").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Confirmed,
    Preparing,
    Ready,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
    Arrived,
    #[serde(rename = "Picked Up")]
    PickedUp,
    OnTheWay,
    ArrivedAtCustomer,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 12] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::ReadyForPickup,
        OrderStatus::Arrived,
        OrderStatus::PickedUp,
        OrderStatus::OnTheWay,
        OrderStatus::ArrivedAtCustomer,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::ReadyForPickup => "Ready for Pickup",
            OrderStatus::Arrived => "Arrived",
            OrderStatus::PickedUp => "Picked Up",
            OrderStatus::OnTheWay => "OnTheWay",
            OrderStatus::ArrivedAtCustomer => "ArrivedAtCustomer",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Delivered and Cancelled accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Order snapshot - computed from event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    /// Ordering customer (user id)
    pub customer_id: String,
    pub restaurant_id: String,
    /// Assigned rider, None until a rider accepts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_name: Option<String>,
    /// Order status
    pub status: OrderStatus,
    /// Items frozen at checkout
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub service_fee: f64,
    #[serde(default)]
    pub discount: f64,
    /// subtotal + deliveryFee + tax + serviceFee − discount
    pub total: f64,
    /// Gross rider earning (replaced by the distance fare on delivery)
    pub rider_earning: f64,
    /// Net rider earning, set on delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_rider_earning: Option<f64>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub delivery: DeliveryInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Creation timestamp
    pub created_at: i64,
    /// Time of the last status change
    pub status_changed_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    /// Last applied event sequence (for incremental updates)
    pub last_sequence: u64,
    /// State checksum for drift detection (hex string)
    /// Computed from: items.len, total, rider, last_sequence, status
    #[serde(default)]
    pub state_checksum: String,
}

impl OrderSnapshot {
    /// Create a new empty order
    pub fn new(order_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut snapshot = Self {
            order_id,
            customer_id: String::new(),
            restaurant_id: String::new(),
            rider_id: None,
            rider_name: None,
            status: OrderStatus::Pending,
            items: Vec::new(),
            subtotal: 0.0,
            delivery_fee: 0.0,
            tax: 0.0,
            service_fee: 0.0,
            discount: 0.0,
            total: 0.0,
            rider_earning: 0.0,
            net_rider_earning: None,
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::Pending,
            delivery: DeliveryInfo {
                shipping_address: String::new(),
                location: super::types::GeoPoint { lat: 0.0, lng: 0.0 },
                pickup_location: None,
                instructions: None,
                cutlery: false,
            },
            cancel_reason: None,
            created_at: now,
            status_changed_at: now,
            updated_at: now,
            delivered_at: None,
            cancelled_at: None,
            last_sequence: 0,
            state_checksum: String::new(),
        };
        snapshot.update_checksum();
        snapshot
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_rider(&self) -> bool {
        self.rider_id.is_some()
    }

    /// Whether `rider_id` is the assigned rider
    pub fn involves_rider(&self, rider_id: &str) -> bool {
        self.rider_id.as_deref() == Some(rider_id)
    }

    /// Compute state checksum for drift detection
    ///
    /// Returns a 16-character hex string built from the item count, total
    /// (in cents), assigned rider, last sequence and status.
    pub fn compute_checksum(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher as _;

        let mut hasher = DefaultHasher::new();

        self.items.len().hash(&mut hasher);

        // cents, avoids float precision issues
        ((self.total * 100.0).round() as i64).hash(&mut hasher);

        self.rider_id.hash(&mut hasher);
        self.last_sequence.hash(&mut hasher);
        (self.status as u8).hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }

    /// Update the state_checksum field based on current state
    pub fn update_checksum(&mut self) {
        self.state_checksum = self.compute_checksum();
    }

    /// Verify that the state_checksum matches computed checksum
    /// Returns true if checksum matches, false if drift detected
    pub fn verify_checksum(&self) -> bool {
        self.state_checksum == self.compute_checksum()
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_persisted_strings() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::ReadyForPickup).unwrap(),
            "\"Ready for Pickup\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::PickedUp).unwrap(),
            "\"Picked Up\""
        );
        let status: OrderStatus = serde_json::from_str("\"ArrivedAtCustomer\"").unwrap();
        assert_eq!(status, OrderStatus::ArrivedAtCustomer);

        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::ArrivedAtCustomer.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_checksum_tracks_rider_and_status() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        assert!(snapshot.verify_checksum());

        snapshot.rider_id = Some("rider-1".to_string());
        assert!(!snapshot.verify_checksum());
        snapshot.update_checksum();

        snapshot.status = OrderStatus::Accepted;
        assert!(!snapshot.verify_checksum());
    }

    #[test]
    fn test_snapshot_json_is_camel_case() {
        let snapshot = OrderSnapshot::new("order-1".to_string());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("deliveryFee").is_some());
        assert!(json.get("paymentStatus").is_some());
        assert!(json.get("riderId").is_none());
        assert_eq!(json["status"], "Pending");
    }
}
