//! OrderStatusChanged event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderStatusChanged applier
pub struct StatusChangedApplier;

impl EventApplier for StatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderStatusChanged { to, .. } = &event.payload {
            snapshot.status = *to;
            snapshot.status_changed_at = event.timestamp;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_event;
    use shared::order::{OrderEventType, OrderStatus};

    #[test]
    fn test_status_changed_sets_status_and_stamp() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.last_sequence = 3;

        let event = test_event(
            "order-1",
            4,
            OrderEventType::OrderStatusChanged,
            EventPayload::OrderStatusChanged {
                from: OrderStatus::Pending,
                to: OrderStatus::Preparing,
            },
        );
        StatusChangedApplier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.status, OrderStatus::Preparing);
        assert_eq!(snapshot.status_changed_at, event.timestamp);
        assert_eq!(snapshot.last_sequence, 4);
        assert!(snapshot.verify_checksum());
    }
}
