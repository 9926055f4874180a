//! RefundOrder command handler
//!
//! Returns the total of a cancelled prepaid order to the customer wallet.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::types::CommandErrorCode;
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus, PaymentStatus};

/// RefundOrder action
#[derive(Debug, Clone)]
pub struct RefundOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for RefundOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !metadata.actor.is_admin() {
            return Err(OrderError::PermissionDenied(
                "only admins may refund orders".to_string(),
            ));
        }

        let snapshot = ctx.load_snapshot(&self.order_id)?;

        if snapshot.payment_status == PaymentStatus::Refunded {
            return Err(OrderError::Conflict(
                CommandErrorCode::PaymentAlreadyRefunded,
                format!("order {} is already refunded", self.order_id),
            ));
        }
        if snapshot.status != OrderStatus::Cancelled {
            return Err(OrderError::InvalidOperation(
                CommandErrorCode::RefundNotAllowed,
                format!("only cancelled orders can be refunded, order is {}", snapshot.status),
            ));
        }
        if snapshot.payment_method.is_cod() || snapshot.payment_status != PaymentStatus::Paid {
            return Err(OrderError::InvalidOperation(
                CommandErrorCode::RefundNotAllowed,
                "nothing was collected for this order".to_string(),
            ));
        }

        let seq = ctx.next_sequence();
        let event = metadata.event(
            seq,
            &self.order_id,
            OrderEventType::OrderRefunded,
            EventPayload::OrderRefunded {
                customer_id: snapshot.customer_id.clone(),
                amount: snapshot.total,
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
    use shared::order::{ActorRole, PaymentMethod};

    fn paid_card_order(status: OrderStatus) -> shared::order::OrderSnapshot {
        let mut snapshot = order("order-1", status);
        snapshot.payment_method = PaymentMethod::Card;
        snapshot.payment_status = PaymentStatus::Paid;
        snapshot
    }

    fn refund() -> RefundOrderAction {
        RefundOrderAction {
            order_id: "order-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_refund_cancelled_card_order() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &paid_card_order(OrderStatus::Cancelled))
            .unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let events = refund()
            .execute(&mut ctx, &metadata(actor(ActorRole::Admin)))
            .await
            .unwrap();
        if let EventPayload::OrderRefunded {
            customer_id,
            amount,
        } = &events[0].payload
        {
            assert_eq!(customer_id, "customer-user");
            assert_eq!(*amount, 500.0);
        } else {
            panic!("Expected OrderRefunded payload");
        }
    }

    #[tokio::test]
    async fn test_refund_requires_admin() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage
            .store_snapshot(&txn, &paid_card_order(OrderStatus::Cancelled))
            .unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);

        let result = refund()
            .execute(&mut ctx, &metadata(actor(ActorRole::Customer)))
            .await;
        assert!(matches!(result, Err(OrderError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_refund_rules() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let admin = metadata(actor(ActorRole::Admin));

        // Still active
        ctx.save_snapshot(paid_card_order(OrderStatus::Preparing));
        assert!(matches!(
            refund().execute(&mut ctx, &admin).await,
            Err(OrderError::InvalidOperation(CommandErrorCode::RefundNotAllowed, _))
        ));

        // COD never collected
        let mut cod = order("order-1", OrderStatus::Cancelled);
        cod.payment_method = PaymentMethod::Cod;
        ctx.save_snapshot(cod);
        assert!(matches!(
            refund().execute(&mut ctx, &admin).await,
            Err(OrderError::InvalidOperation(CommandErrorCode::RefundNotAllowed, _))
        ));

        // Already refunded
        let mut refunded = paid_card_order(OrderStatus::Cancelled);
        refunded.payment_status = PaymentStatus::Refunded;
        ctx.save_snapshot(refunded);
        assert!(matches!(
            refund().execute(&mut ctx, &admin).await,
            Err(OrderError::Conflict(CommandErrorCode::PaymentAlreadyRefunded, _))
        ));
    }
}
