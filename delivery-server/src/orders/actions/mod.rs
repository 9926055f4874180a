//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::core::config::FinanceConfig;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

mod accept_order;
mod cancel_order;
mod place_order;
mod refund_order;
mod update_status;

pub use accept_order::AcceptOrderAction;
pub use cancel_order::CancelOrderAction;
pub use place_order::PlaceOrderAction;
pub use refund_order::RefundOrderAction;
pub use update_status::UpdateStatusAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    PlaceOrder(PlaceOrderAction),
    UpdateStatus(UpdateStatusAction),
    CancelOrder(CancelOrderAction),
    AcceptOrder(AcceptOrderAction),
    RefundOrder(RefundOrderAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::PlaceOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateStatus(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::AcceptOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::RefundOrder(action) => action.execute(ctx, metadata).await,
        }
    }
}

impl CommandAction {
    /// Inject the commission / fare settings the delivery settlement needs
    pub fn with_finance(mut self, finance: &FinanceConfig) -> Self {
        if let CommandAction::UpdateStatus(action) = &mut self {
            action.finance = finance.clone();
        }
        self
    }
}

/// Convert OrderCommand to CommandAction
///
/// This is the ONLY place with a match on OrderCommandPayload.
impl From<&OrderCommand> for CommandAction {
    fn from(cmd: &OrderCommand) -> Self {
        match &cmd.payload {
            OrderCommandPayload::PlaceOrder { input } => {
                CommandAction::PlaceOrder(PlaceOrderAction {
                    input: input.clone(),
                })
            }
            OrderCommandPayload::UpdateStatus {
                order_id,
                status,
                distance_km,
            } => CommandAction::UpdateStatus(UpdateStatusAction {
                order_id: order_id.clone(),
                status: *status,
                distance_km: *distance_km,
                finance: FinanceConfig::default(), // injected by OrdersManager
            }),
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::AcceptOrder { order_id, rider_id } => {
                CommandAction::AcceptOrder(AcceptOrderAction {
                    order_id: order_id.clone(),
                    rider_id: rider_id.clone(),
                })
            }
            OrderCommandPayload::RefundOrder { order_id } => {
                CommandAction::RefundOrder(RefundOrderAction {
                    order_id: order_id.clone(),
                })
            }
        }
    }
}
