//! OrderPlaced event applier
//!
//! Fills a fresh snapshot with the checkout data.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderPlaced applier
pub struct OrderPlacedApplier;

impl EventApplier for OrderPlacedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderPlaced {
            customer_id,
            restaurant_id,
            items,
            pricing,
            payment_method,
            payment_status,
            delivery,
        } = &event.payload
        {
            snapshot.order_id = event.order_id.clone();
            snapshot.customer_id = customer_id.clone();
            snapshot.restaurant_id = restaurant_id.clone();
            snapshot.items = items.clone();
            snapshot.subtotal = pricing.subtotal;
            snapshot.delivery_fee = pricing.delivery_fee;
            snapshot.tax = pricing.tax;
            snapshot.service_fee = pricing.service_fee;
            snapshot.discount = pricing.discount;
            snapshot.total = pricing.total;
            snapshot.rider_earning = pricing.rider_earning;
            snapshot.payment_method = *payment_method;
            snapshot.payment_status = *payment_status;
            snapshot.delivery = delivery.clone();
            snapshot.status = OrderStatus::Pending;

            snapshot.created_at = event.timestamp;
            snapshot.status_changed_at = event.timestamp;

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
            snapshot.update_checksum();
        }
    }
}
