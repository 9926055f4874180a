//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::order::{
    OrderCommand, OrderCommandPayload, OrderEvent, OrderSnapshot, OrderStatus, PlaceOrderInput,
};

use crate::auth::ActingUser;
use crate::auth::permissions::can_view_order;
use crate::core::ServerState;
use crate::core::state::run_blocking;
use crate::utils::{AppError, AppResult};

/// Status change request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    /// Trip distance, feeds the rider fare on delivery
    #[serde(default)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub distance_km: Option<f64>,
}

/// Run a command for the acting user and return the order afterwards
async fn command(
    state: &ServerState,
    acting: ActingUser,
    order_id: &str,
    payload: OrderCommandPayload,
) -> AppResult<Json<OrderSnapshot>> {
    state
        .execute(OrderCommand::new(acting.actor, payload))
        .await?;
    Ok(Json(state.load_order(order_id).await?))
}

async fn visible_order(
    state: &ServerState,
    acting: &ActingUser,
    order_id: &str,
) -> AppResult<OrderSnapshot> {
    let order = state.load_order(order_id).await?;
    if !can_view_order(&acting.actor, &order) {
        return Err(AppError::permission_denied(format!(
            "Order {} is not visible to this user",
            order_id
        )));
    }
    Ok(order)
}

/// Checkout
pub async fn place(
    State(state): State<ServerState>,
    acting: ActingUser,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<OrderSnapshot>> {
    let response = state
        .execute(OrderCommand::new(
            acting.actor,
            OrderCommandPayload::PlaceOrder { input },
        ))
        .await?;
    let order_id = response
        .order_id
        .ok_or_else(|| AppError::internal("PlaceOrder returned no order id"))?;
    Ok(Json(state.load_order(&order_id).await?))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(visible_order(&state, &acting, &id).await?))
}

/// Event history of one order, oldest first
pub async fn events(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<OrderEvent>>> {
    visible_order(&state, &acting, &id).await?;
    let orders = state.orders.clone();
    let events = run_blocking(move || Ok(orders.get_events_for_order(&id)?)).await?;
    Ok(Json(events))
}

pub async fn update_status(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdate>,
) -> AppResult<Json<OrderSnapshot>> {
    let payload = OrderCommandPayload::UpdateStatus {
        order_id: id.clone(),
        status: req.status,
        distance_km: req.distance_km,
    };
    command(&state, acting, &id, payload).await
}

pub async fn cancel(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<Json<OrderSnapshot>> {
    let Json(req) = body.unwrap_or_default();
    let payload = OrderCommandPayload::CancelOrder {
        order_id: id.clone(),
        reason: req.reason,
    };
    command(&state, acting, &id, payload).await
}

/// Shortcut for `status = Delivered`
pub async fn complete(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    body: Option<Json<CompleteRequest>>,
) -> AppResult<Json<OrderSnapshot>> {
    let Json(req) = body.unwrap_or_default();
    let payload = OrderCommandPayload::UpdateStatus {
        order_id: id.clone(),
        status: OrderStatus::Delivered,
        distance_km: req.distance_km,
    };
    command(&state, acting, &id, payload).await
}

/// Refund a cancelled prepaid order to the customer wallet (admin)
pub async fn refund(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    let payload = OrderCommandPayload::RefundOrder {
        order_id: id.clone(),
    };
    command(&state, acting, &id, payload).await
}
