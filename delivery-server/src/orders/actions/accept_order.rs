//! AcceptOrder command handler
//!
//! Resolves the race between riders for an unassigned order. The checks run
//! inside the manager's write transaction; redb admits a single writer, so
//! the first committed accept wins and every later one sees the rider.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::types::CommandErrorCode;
use shared::order::{ActorRole, EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// AcceptOrder action
#[derive(Debug, Clone)]
pub struct AcceptOrderAction {
    pub order_id: String,
    pub rider_id: String,
}

#[async_trait]
impl CommandHandler for AcceptOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Riders accept for themselves only
        let actor = &metadata.actor;
        let acting_for_self =
            actor.role == ActorRole::Rider && actor.rider_id.as_deref() == Some(&self.rider_id);
        if !actor.is_admin() && !acting_for_self {
            return Err(OrderError::PermissionDenied(
                "riders may only accept orders for themselves".to_string(),
            ));
        }

        // 2. Load order; re-accepting your own order changes nothing
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if snapshot.involves_rider(&self.rider_id) {
            return Ok(vec![]);
        }

        // 3. Rider preconditions
        let rider = ctx.load_rider(&self.rider_id)?;
        if !rider.is_approved() {
            return Err(OrderError::InvalidOperation(
                CommandErrorCode::RiderNotVerified,
                format!("rider {} is not verified", rider.id),
            ));
        }
        if !rider.online {
            return Err(OrderError::Conflict(
                CommandErrorCode::RiderOffline,
                format!("rider {} is offline", rider.id),
            ));
        }
        if let Some(current) = rider.current_order.as_deref()
            && ctx.is_order_open(current)?
        {
            return Err(OrderError::Conflict(
                CommandErrorCode::RiderBusy,
                format!("rider already has an active order {}", current),
            ));
        }

        // 4. Order must still be open and unassigned
        if snapshot.is_terminal() {
            return Err(OrderError::InvalidTransition {
                from: snapshot.status,
                to: OrderStatus::Accepted,
                reason: "order is already closed".to_string(),
            });
        }
        if snapshot.has_rider() {
            return Err(OrderError::Conflict(
                CommandErrorCode::OrderAlreadyAssigned,
                "Order already assigned to another rider".to_string(),
            ));
        }

        let from = snapshot.status;
        let to = if from == OrderStatus::Pending {
            OrderStatus::Accepted
        } else {
            from
        };

        let seq = ctx.next_sequence();
        let event = metadata.event(
            seq,
            &self.order_id,
            OrderEventType::RiderAssigned,
            EventPayload::RiderAssigned {
                rider_id: rider.id.clone(),
                rider_name: rider.name.clone(),
                from,
                to,
            },
        );

        Ok(vec![event])
    }
}
