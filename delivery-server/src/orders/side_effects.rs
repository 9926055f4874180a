//! Rider and ledger updates driven by order events
//!
//! Run by the manager after the appliers, inside the same write transaction
//! as the events, so an order transition and its money movements commit
//! together or not at all.
//!
//! | Event | Effect |
//! |-------|--------|
//! | RiderAssigned | `rider.currentOrder = order` |
//! | OrderDelivered | release rider, count delivery, book earning (+ COD cash and restaurant share) |
//! | OrderCancelled | release rider |
//! | OrderRefunded | credit customer wallet |

use shared::models::{Direction, EntityType, LedgerKind, order_entry_key};
use shared::order::{DeliverySettlement, EventPayload, OrderEvent, OrderSnapshot};

use super::traits::{CommandContext, OrderError};
use crate::ledger::posting::{Posting, post_entry};

/// Apply the non-snapshot effects of one event
pub fn apply(
    ctx: &CommandContext<'_>,
    event: &OrderEvent,
    snapshot: &OrderSnapshot,
) -> Result<(), OrderError> {
    match &event.payload {
        EventPayload::RiderAssigned { rider_id, .. } => {
            let mut rider = ctx.load_rider(rider_id)?;
            rider.current_order = Some(event.order_id.clone());
            rider.updated_at = event.timestamp;
            ctx.save_rider(&rider)?;
        }
        EventPayload::OrderDelivered { settlement, .. } => {
            release_rider(ctx, &settlement.rider_id, event, true)?;
            book_delivery(ctx, event, snapshot, settlement)?;
        }
        EventPayload::OrderCancelled {
            rider_id: Some(rider_id),
            ..
        } => {
            release_rider(ctx, rider_id, event, false)?;
        }
        EventPayload::OrderRefunded {
            customer_id,
            amount,
        } => {
            book(
                ctx,
                event,
                EntityType::Customer,
                customer_id,
                LedgerKind::Refund,
                *amount,
            )?;
        }
        EventPayload::OrderPlaced { .. }
        | EventPayload::OrderStatusChanged { .. }
        | EventPayload::OrderCancelled { rider_id: None, .. } => {}
    }
    Ok(())
}

/// Clear `currentOrder` when it still points at this order
fn release_rider(
    ctx: &CommandContext<'_>,
    rider_id: &str,
    event: &OrderEvent,
    delivered: bool,
) -> Result<(), OrderError> {
    let Some(mut rider) = ctx.find_rider(rider_id)? else {
        tracing::warn!(rider_id = %rider_id, order_id = %event.order_id, "Assigned rider no longer exists");
        return Ok(());
    };
    if rider.current_order.as_deref() == Some(event.order_id.as_str()) {
        rider.current_order = None;
    }
    if delivered {
        rider.completed_deliveries += 1;
    }
    rider.updated_at = event.timestamp;
    ctx.save_rider(&rider)
}

fn book_delivery(
    ctx: &CommandContext<'_>,
    event: &OrderEvent,
    snapshot: &OrderSnapshot,
    settlement: &DeliverySettlement,
) -> Result<(), OrderError> {
    book(
        ctx,
        event,
        EntityType::Rider,
        &settlement.rider_id,
        LedgerKind::DeliveryEarning,
        settlement.net_earning,
    )?;
    book(
        ctx,
        event,
        EntityType::Rider,
        &settlement.rider_id,
        LedgerKind::CodCollected,
        settlement.cod_collected,
    )?;
    book(
        ctx,
        event,
        EntityType::Restaurant,
        &snapshot.restaurant_id,
        LedgerKind::CodSale,
        settlement.restaurant_credit,
    )?;
    Ok(())
}

/// Credit `amount`, keyed by (order, kind, entity); zero amounts book nothing
fn book(
    ctx: &CommandContext<'_>,
    event: &OrderEvent,
    entity_type: EntityType,
    entity_id: &str,
    kind: LedgerKind,
    amount: f64,
) -> Result<(), OrderError> {
    if amount <= 0.0 {
        return Ok(());
    }
    post_entry(
        ctx.storage(),
        ctx.txn(),
        Posting {
            key: order_entry_key(&event.order_id, kind, entity_type),
            entity_type,
            entity_id: entity_id.to_string(),
            order_id: Some(event.order_id.clone()),
            kind,
            amount,
            direction: Direction::Credit,
            timestamp: event.timestamp,
            note: None,
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_event;
    use crate::orders::storage::OrderStorage;
    use shared::models::{Rider, VerificationStatus};
    use shared::order::{OrderEventType, OrderStatus, PaymentMethod};

    fn settlement(cod: bool) -> DeliverySettlement {
        DeliverySettlement {
            rider_id: "rider-1".to_string(),
            distance_km: None,
            gross_earning: 100.0,
            rider_commission: 10.0,
            net_earning: 90.0,
            cod_collected: if cod { 500.0 } else { 0.0 },
            platform_commission: if cod { 75.0 } else { 0.0 },
            restaurant_credit: if cod { 425.0 } else { 0.0 },
        }
    }

    fn busy_rider(storage: &OrderStorage, txn: &redb::WriteTransaction) {
        let mut rider = Rider::new("rider-1".into(), "u-1".into(), "Ali".into(), 0);
        rider.verification = VerificationStatus::Approved;
        rider.current_order = Some("order-1".to_string());
        storage.store_rider(txn, &rider).unwrap();
    }

    fn snapshot() -> OrderSnapshot {
        let mut s = OrderSnapshot::new("order-1".to_string());
        s.restaurant_id = "rest-1".to_string();
        s.payment_method = PaymentMethod::Cod;
        s.total = 500.0;
        s
    }

    fn delivered(cod: bool) -> OrderEvent {
        test_event(
            "order-1",
            7,
            OrderEventType::OrderDelivered,
            EventPayload::OrderDelivered {
                from: OrderStatus::ArrivedAtCustomer,
                settlement: settlement(cod),
            },
        )
    }

    #[test]
    fn test_delivery_books_cod_and_releases_rider() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        busy_rider(&storage, &txn);
        let ctx = CommandContext::new(&txn, &storage, 7);

        apply(&ctx, &delivered(true), &snapshot()).unwrap();

        let rider = ctx.load_rider("rider-1").unwrap();
        assert!(rider.current_order.is_none());
        assert_eq!(rider.completed_deliveries, 1);
        assert_eq!(rider.wallet_balance, 90.0);
        assert_eq!(rider.cod_held, 500.0);
        let account = storage
            .get_account_txn(&txn, EntityType::Restaurant, "rest-1")
            .unwrap()
            .unwrap();
        assert_eq!(account.balance, 425.0);
    }

    #[test]
    fn test_replayed_delivery_does_not_double_book() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        busy_rider(&storage, &txn);
        let ctx = CommandContext::new(&txn, &storage, 7);

        let event = delivered(false);
        apply(&ctx, &event, &snapshot()).unwrap();
        apply(&ctx, &event, &snapshot()).unwrap();

        let rider = ctx.load_rider("rider-1").unwrap();
        assert_eq!(rider.wallet_balance, 90.0);
        assert_eq!(rider.cod_held, 0.0);
        assert!(
            storage
                .get_account_txn(&txn, EntityType::Restaurant, "rest-1")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_assignment_and_cancellation_track_current_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_rider(&txn, &Rider::new("rider-1".into(), "u-1".into(), "Ali".into(), 0))
            .unwrap();
        let ctx = CommandContext::new(&txn, &storage, 0);

        let assigned = test_event(
            "order-1",
            1,
            OrderEventType::RiderAssigned,
            EventPayload::RiderAssigned {
                rider_id: "rider-1".to_string(),
                rider_name: "Ali".to_string(),
                from: OrderStatus::Pending,
                to: OrderStatus::Accepted,
            },
        );
        apply(&ctx, &assigned, &snapshot()).unwrap();
        assert_eq!(
            ctx.load_rider("rider-1").unwrap().current_order.as_deref(),
            Some("order-1")
        );

        let cancelled = test_event(
            "order-1",
            2,
            OrderEventType::OrderCancelled,
            EventPayload::OrderCancelled {
                from: OrderStatus::Accepted,
                reason: None,
                rider_id: Some("rider-1".to_string()),
            },
        );
        apply(&ctx, &cancelled, &snapshot()).unwrap();
        let rider = ctx.load_rider("rider-1").unwrap();
        assert!(rider.current_order.is_none());
        assert_eq!(rider.completed_deliveries, 0);
        assert_eq!(rider.wallet_balance, 0.0);
    }

    #[test]
    fn test_refund_credits_customer() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let ctx = CommandContext::new(&txn, &storage, 0);

        let refunded = test_event(
            "order-1",
            3,
            OrderEventType::OrderRefunded,
            EventPayload::OrderRefunded {
                customer_id: "cust-1".to_string(),
                amount: 1030.0,
            },
        );
        apply(&ctx, &refunded, &snapshot()).unwrap();

        let account = storage
            .get_account_txn(&txn, EntityType::Customer, "cust-1")
            .unwrap()
            .unwrap();
        assert_eq!(account.balance, 1030.0);
    }
}
