//! OrderDelivered event applier
//!
//! Closes the order and records the settled rider earning. Ledger postings
//! are made by the manager in the same transaction.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus, PaymentStatus};

/// OrderDelivered applier
pub struct OrderDeliveredApplier;

impl EventApplier for OrderDeliveredApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderDelivered { settlement, .. } = &event.payload {
            snapshot.status = OrderStatus::Delivered;
            snapshot.status_changed_at = event.timestamp;
            snapshot.delivered_at = Some(event.timestamp);

            snapshot.rider_earning = settlement.gross_earning;
            snapshot.net_rider_earning = Some(settlement.net_earning);
            // COD cash is in hand; prepaid orders were already paid
            snapshot.payment_status = PaymentStatus::Paid;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
