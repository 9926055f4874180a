//! PlaceOrder command handler
//!
//! Freezes the cart into an order and records `OrderPlaced`.

use async_trait::async_trait;

use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_order_optional_text,
    validate_order_text,
};
use shared::order::{
    ActorRole, EventPayload, OrderEvent, OrderEventType, PaymentStatus, PlaceOrderInput,
};

/// PlaceOrder action
#[derive(Debug, Clone)]
pub struct PlaceOrderAction {
    pub input: PlaceOrderInput,
}

#[async_trait]
impl CommandHandler for PlaceOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let input = &self.input;

        // 1. Resolve the ordering customer
        let customer_id = match metadata.actor.role {
            ActorRole::Customer => metadata.actor.user_id.clone(),
            ActorRole::Admin => input.customer_id.clone().ok_or_else(|| {
                OrderError::InvalidOperation(
                    shared::order::types::CommandErrorCode::ValidationFailed,
                    "customerId is required when an admin places an order".to_string(),
                )
            })?,
            role => {
                return Err(OrderError::PermissionDenied(format!(
                    "{} may not place orders",
                    role
                )));
            }
        };

        // 2. Validate text inputs
        validate_order_text(&input.restaurant_id, "restaurantId", MAX_SHORT_TEXT_LEN)?;
        validate_order_text(&customer_id, "customerId", MAX_SHORT_TEXT_LEN)?;
        validate_order_text(
            &input.delivery.shipping_address,
            "shippingAddress",
            MAX_ADDRESS_LEN,
        )?;
        validate_order_optional_text(&input.delivery.instructions, "instructions", MAX_NOTE_LEN)?;

        // 3. Price the cart
        let (items, pricing) = money::compute_pricing(input)?;

        // 4. Prepaid methods are captured at checkout
        let payment_status = if input.payment_method.is_cod() {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Paid
        };

        let order_id = shared::util::new_id();
        let seq = ctx.next_sequence();
        let event = metadata.event(
            seq,
            &order_id,
            OrderEventType::OrderPlaced,
            EventPayload::OrderPlaced {
                customer_id,
                restaurant_id: input.restaurant_id.clone(),
                items,
                pricing,
                payment_method: input.payment_method,
                payment_status,
                delivery: input.delivery.clone(),
            },
        );

        Ok(vec![event])
    }
}
