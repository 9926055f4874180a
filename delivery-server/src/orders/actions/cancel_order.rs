//! CancelOrder command handler

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions::{self, Transition};
use crate::utils::validation::{MAX_NOTE_LEN, validate_order_optional_text};
use shared::order::{EventPayload, OrderEvent, OrderEventType};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        validate_order_optional_text(&self.reason, "reason", MAX_NOTE_LEN)?;

        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if transitions::authorize_cancel(&metadata.actor, &snapshot)? == Transition::NoOp {
            return Ok(vec![]);
        }

        let seq = ctx.next_sequence();
        let event = metadata.event(
            seq,
            &self.order_id,
            OrderEventType::OrderCancelled,
            EventPayload::OrderCancelled {
                from: snapshot.status,
                reason: self.reason.clone(),
                // The assigned rider is released by the manager
                rider_id: snapshot.rider_id.clone(),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::{actor, metadata, order};
    use crate::orders::storage::OrderStorage;
    use shared::order::{ActorRole, OrderStatus};

    fn cancel(reason: Option<&str>) -> CancelOrderAction {
        CancelOrderAction {
            order_id: "order-1".to_string(),
            reason: reason.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_customer_cancels_pending_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &order("order-1", OrderStatus::Pending))
            .unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let events = cancel(Some("changed my mind"))
            .execute(&mut ctx, &metadata(actor(ActorRole::Customer)))
            .await
            .unwrap();

        if let EventPayload::OrderCancelled {
            from,
            reason,
            rider_id,
        } = &events[0].payload
        {
            assert_eq!(*from, OrderStatus::Pending);
            assert_eq!(reason.as_deref(), Some("changed my mind"));
            assert!(rider_id.is_none());
        } else {
            panic!("Expected OrderCancelled payload");
        }
    }

    #[tokio::test]
    async fn test_cancel_releases_rider() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut snapshot = order("order-1", OrderStatus::PickedUp);
        snapshot.rider_id = Some("rider-1".to_string());
        storage.store_snapshot(&txn, &snapshot).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let events = cancel(None)
            .execute(&mut ctx, &metadata(actor(ActorRole::Admin)))
            .await
            .unwrap();
        if let EventPayload::OrderCancelled { rider_id, .. } = &events[0].payload {
            assert_eq!(rider_id.as_deref(), Some("rider-1"));
        } else {
            panic!("Expected OrderCancelled payload");
        }
    }

    #[tokio::test]
    async fn test_rider_cannot_cancel() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut snapshot = order("order-1", OrderStatus::Arrived);
        snapshot.rider_id = Some("rider-1".to_string());
        storage.store_snapshot(&txn, &snapshot).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let result = cancel(None)
            .execute(&mut ctx, &metadata(actor(ActorRole::Rider)))
            .await;
        assert!(matches!(result, Err(OrderError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_cancel_twice_is_noop() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &order("order-1", OrderStatus::Cancelled))
            .unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let events = cancel(None)
            .execute(&mut ctx, &metadata(actor(ActorRole::Admin)))
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_delivered_order_cannot_be_cancelled() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &order("order-1", OrderStatus::Delivered))
            .unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let result = cancel(None)
            .execute(&mut ctx, &metadata(actor(ActorRole::Admin)))
            .await;
        assert!(matches!(result, Err(OrderError::InvalidOperation(..))));
    }
}
