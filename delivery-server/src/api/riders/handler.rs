//! Rider API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    CodRemittance, Rider, RiderCreate, RiderOnlineUpdate, RiderVerificationUpdate,
};
use shared::order::{ActorRole, GeoPoint, OrderCommand, OrderCommandPayload};

use crate::auth::ActingUser;
use crate::auth::permissions::ensure_rider_self;
use crate::core::ServerState;
use crate::core::state::run_blocking;
use crate::orders::AvailableOrder;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequest {
    pub order_id: String,
}

/// Register the caller's rider profile
pub async fn register(
    State(state): State<ServerState>,
    acting: ActingUser,
    body: Option<Json<RiderCreate>>,
) -> AppResult<Json<Rider>> {
    if acting.user.role != ActorRole::Rider {
        return Err(AppError::permission_denied(
            "Only rider accounts can register a rider profile",
        ));
    }
    let Json(input) = body.unwrap_or_default();
    let riders = state.riders.clone();
    let user = acting.user;
    let rider = run_blocking(move || riders.register(&user.id, &user.username, input)).await?;
    Ok(Json(rider))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
) -> AppResult<Json<Rider>> {
    ensure_rider_self(&acting.actor, &id)?;
    let riders = state.riders.clone();
    Ok(Json(run_blocking(move || riders.get(&id)).await?))
}

/// Admin review of a rider application
pub async fn set_verification(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<RiderVerificationUpdate>,
) -> AppResult<Json<Rider>> {
    let riders = state.riders.clone();
    let rider = run_blocking(move || riders.set_verification(&id, req.status)).await?;
    Ok(Json(rider))
}

pub async fn set_online(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    Json(req): Json<RiderOnlineUpdate>,
) -> AppResult<Json<Rider>> {
    ensure_rider_self(&acting.actor, &id)?;
    let riders = state.riders.clone();
    let rider = run_blocking(move || riders.set_online(&id, req.online)).await?;
    Ok(Json(rider))
}

pub async fn update_location(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    Json(point): Json<GeoPoint>,
) -> AppResult<Json<Rider>> {
    ensure_rider_self(&acting.actor, &id)?;
    let riders = state.riders.clone();
    let rider = run_blocking(move || riders.update_location(&id, point)).await?;
    Ok(Json(rider))
}

/// Unassigned orders within `radiusKm` of the rider, nearest first
pub async fn available_orders(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    Query(query): Query<AvailableQuery>,
) -> AppResult<Json<Vec<AvailableOrder>>> {
    ensure_rider_self(&acting.actor, &id)?;
    let riders = state.riders.clone();
    let orders = run_blocking(move || riders.available_orders(&id, query.radius_km)).await?;
    Ok(Json(orders))
}

/// Take an order. Concurrent accepts of the same order: exactly one wins,
/// the rest get 409.
pub async fn accept_order(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path(id): Path<String>,
    Json(req): Json<AcceptRequest>,
) -> AppResult<Json<Rider>> {
    ensure_rider_self(&acting.actor, &id)?;
    let payload = OrderCommandPayload::AcceptOrder {
        order_id: req.order_id,
        rider_id: id.clone(),
    };
    state
        .execute(OrderCommand::new(acting.actor, payload))
        .await?;

    let riders = state.riders.clone();
    Ok(Json(run_blocking(move || riders.get(&id)).await?))
}

/// Record cash handed over by the rider
pub async fn remit_cod(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<CodRemittance>,
) -> AppResult<Json<Rider>> {
    let ledger = state.ledger.clone();
    let rider = run_blocking(move || ledger.remit_cod(&id, req)).await?;
    Ok(Json(rider))
}
