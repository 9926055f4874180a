//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent};

mod order_cancelled;
mod order_delivered;
mod order_placed;
mod order_refunded;
mod rider_assigned;
mod status_changed;

pub use order_cancelled::OrderCancelledApplier;
pub use order_delivered::OrderDeliveredApplier;
pub use order_placed::OrderPlacedApplier;
pub use order_refunded::OrderRefundedApplier;
pub use rider_assigned::RiderAssignedApplier;
pub use status_changed::StatusChangedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderPlaced(OrderPlacedApplier),
    StatusChanged(StatusChangedApplier),
    RiderAssigned(RiderAssignedApplier),
    OrderDelivered(OrderDeliveredApplier),
    OrderCancelled(OrderCancelledApplier),
    OrderRefunded(OrderRefundedApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderPlaced { .. } => EventAction::OrderPlaced(OrderPlacedApplier),
            EventPayload::OrderStatusChanged { .. } => {
                EventAction::StatusChanged(StatusChangedApplier)
            }
            EventPayload::RiderAssigned { .. } => EventAction::RiderAssigned(RiderAssignedApplier),
            EventPayload::OrderDelivered { .. } => {
                EventAction::OrderDelivered(OrderDeliveredApplier)
            }
            EventPayload::OrderCancelled { .. } => {
                EventAction::OrderCancelled(OrderCancelledApplier)
            }
            EventPayload::OrderRefunded { .. } => EventAction::OrderRefunded(OrderRefundedApplier),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_event(
    order_id: &str,
    seq: u64,
    event_type: shared::order::OrderEventType,
    payload: EventPayload,
) -> OrderEvent {
    let actor = shared::order::Actor {
        user_id: "user-1".to_string(),
        name: "Test User".to_string(),
        role: shared::order::ActorRole::Admin,
        restaurant_id: None,
        rider_id: None,
    };
    OrderEvent::new(
        seq,
        order_id.to_string(),
        &actor,
        "cmd-1".to_string(),
        Some(1234567890),
        event_type,
        payload,
    )
}
