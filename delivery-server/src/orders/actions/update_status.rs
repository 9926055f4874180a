//! UpdateStatus command handler
//!
//! Moves an order one step along the status table. Delivery also computes
//! the rider earning and COD split; the manager books them to the ledger.

use async_trait::async_trait;

use super::CancelOrderAction;
use crate::core::config::FinanceConfig;
use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions::{self, Transition};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// UpdateStatus action
#[derive(Debug, Clone)]
pub struct UpdateStatusAction {
    pub order_id: String,
    pub status: OrderStatus,
    /// Reported by the rider on delivery
    pub distance_km: Option<f64>,
    pub finance: FinanceConfig,
}

#[async_trait]
impl CommandHandler for UpdateStatusAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.status == OrderStatus::Cancelled {
            let cancel = CancelOrderAction {
                order_id: self.order_id.clone(),
                reason: None,
            };
            return cancel.execute(ctx, metadata).await;
        }

        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Role check, then the transition table
        transitions::authorize_status(&metadata.actor, &snapshot, self.status)?;
        let from = snapshot.status;
        if transitions::check_transition(from, self.status, snapshot.has_rider())?
            == Transition::NoOp
        {
            return Ok(vec![]);
        }

        // 3. Build the event
        let seq = ctx.next_sequence();
        let event = if self.status == OrderStatus::Delivered {
            let rider_id = snapshot.rider_id.as_deref().ok_or_else(|| {
                OrderError::InvalidTransition {
                    from,
                    to: self.status,
                    reason: "no rider assigned".to_string(),
                }
            })?;
            let settlement =
                money::settle_delivery(&snapshot, rider_id, self.distance_km, &self.finance)?;
            metadata.event(
                seq,
                &self.order_id,
                OrderEventType::OrderDelivered,
                EventPayload::OrderDelivered { from, settlement },
            )
        } else {
            metadata.event(
                seq,
                &self.order_id,
                OrderEventType::OrderStatusChanged,
                EventPayload::OrderStatusChanged {
                    from,
                    to: self.status,
                },
            )
        };

        Ok(vec![event])
    }
}
