//! OrderCancelled event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderCancelled applier
pub struct OrderCancelledApplier;

impl EventApplier for OrderCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCancelled { reason, .. } = &event.payload {
            snapshot.status = OrderStatus::Cancelled;
            snapshot.status_changed_at = event.timestamp;
            snapshot.cancelled_at = Some(event.timestamp);
            snapshot.cancel_reason = reason.clone();

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
