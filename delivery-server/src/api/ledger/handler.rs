//! Ledger API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{EntityType, LedgerEntry, LedgerStatement, SettlementCreate};
use shared::order::{Actor, ActorRole};

use crate::auth::ActingUser;
use crate::core::ServerState;
use crate::core::state::run_blocking;
use crate::utils::{AppError, AppResult};

/// 账户所有者：骑手本人、所属餐厅、顾客本人
fn owns_account(actor: &Actor, entity_type: EntityType, entity_id: &str) -> bool {
    match (actor.role, entity_type) {
        (ActorRole::Admin, _) => true,
        (ActorRole::Rider, EntityType::Rider) => actor.rider_id.as_deref() == Some(entity_id),
        (ActorRole::Restaurant, EntityType::Restaurant) => {
            actor.restaurant_id.as_deref() == Some(entity_id)
        }
        (ActorRole::Customer, EntityType::Customer) => actor.user_id == entity_id,
        _ => false,
    }
}

pub async fn statement(
    State(state): State<ServerState>,
    acting: ActingUser,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> AppResult<Json<LedgerStatement>> {
    let entity_type: EntityType = entity_type.parse().map_err(AppError::validation)?;
    if !owns_account(&acting.actor, entity_type, &entity_id) {
        return Err(AppError::permission_denied(format!(
            "Not allowed to read ledger of {entity_type} {entity_id}"
        )));
    }

    let ledger = state.ledger.clone();
    let statement = run_blocking(move || ledger.statement(entity_type, &entity_id)).await?;
    Ok(Json(statement))
}

pub async fn settle(
    State(state): State<ServerState>,
    Json(input): Json<SettlementCreate>,
) -> AppResult<Json<LedgerEntry>> {
    let ledger = state.ledger.clone();
    let entry = run_blocking(move || ledger.settle(input)).await?;
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: ActorRole) -> Actor {
        Actor {
            user_id: "u-1".to_string(),
            name: "Test".to_string(),
            role,
            restaurant_id: (role == ActorRole::Restaurant).then(|| "rest-1".to_string()),
            rider_id: (role == ActorRole::Rider).then(|| "rider-1".to_string()),
        }
    }

    #[test]
    fn test_account_ownership() {
        assert!(owns_account(&actor(ActorRole::Admin), EntityType::Restaurant, "any"));
        assert!(owns_account(&actor(ActorRole::Rider), EntityType::Rider, "rider-1"));
        assert!(!owns_account(&actor(ActorRole::Rider), EntityType::Rider, "rider-2"));
        assert!(owns_account(&actor(ActorRole::Restaurant), EntityType::Restaurant, "rest-1"));
        assert!(owns_account(&actor(ActorRole::Customer), EntityType::Customer, "u-1"));
        // Same id, different entity type
        assert!(!owns_account(&actor(ActorRole::Customer), EntityType::Rider, "u-1"));
    }
}
