//! OrderRefunded event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, PaymentStatus};

/// OrderRefunded applier
pub struct OrderRefundedApplier;

impl EventApplier for OrderRefundedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderRefunded { .. } = &event.payload {
            snapshot.payment_status = PaymentStatus::Refunded;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
