//! RiderAssigned event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// RiderAssigned applier
pub struct RiderAssignedApplier;

impl EventApplier for RiderAssignedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::RiderAssigned {
            rider_id,
            rider_name,
            from,
            to,
        } = &event.payload
        {
            snapshot.rider_id = Some(rider_id.clone());
            snapshot.rider_name = Some(rider_name.clone());
            if from != to {
                snapshot.status = *to;
                snapshot.status_changed_at = event.timestamp;
            }

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
