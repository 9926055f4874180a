//! Order status state machine
//!
//! | Stage | Statuses (forward order) | Setter |
//! |-------|--------------------------|--------|
//! | 0 | Pending | creation |
//! | 1 | Accepted, Confirmed, Preparing | owning restaurant / admin |
//! | 2 | Ready, Ready for Pickup | owning restaurant / admin |
//! | 3 | Arrived | assigned rider / admin |
//! | 4 | Picked Up, OnTheWay | assigned rider / admin |
//! | 5 | ArrivedAtCustomer | assigned rider / admin |
//! | 6 | Delivered | assigned rider / admin |
//!
//! `Cancelled` has no stage; see [`authorize_cancel`].
//!
//! A move is valid when the target comes later in the forward order and its
//! stage is at most one above the current stage. The one exception is the
//! rider's pickup: `Arrived` may follow any kitchen status (stage 1 or 2), so
//! the rider path does not wait on a Ready mark. Re-applying the current
//! status is a no-op.

use shared::order::types::CommandErrorCode;
use shared::order::{Actor, ActorRole, OrderSnapshot, OrderStatus};

use super::traits::OrderError;

/// First stage that belongs to the rider
const RIDER_STAGE: u8 = 3;

/// Who may move an order into a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setter {
    Creation,
    Restaurant,
    Rider,
}

/// Result of validating a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply,
    /// Target equals the current status
    NoOp,
}

/// Logical stage of a status, `None` for `Cancelled`
pub fn stage(status: OrderStatus) -> Option<u8> {
    match status {
        OrderStatus::Pending => Some(0),
        OrderStatus::Accepted | OrderStatus::Confirmed | OrderStatus::Preparing => Some(1),
        OrderStatus::Ready | OrderStatus::ReadyForPickup => Some(2),
        OrderStatus::Arrived => Some(3),
        OrderStatus::PickedUp | OrderStatus::OnTheWay => Some(4),
        OrderStatus::ArrivedAtCustomer => Some(5),
        OrderStatus::Delivered => Some(6),
        OrderStatus::Cancelled => None,
    }
}

/// Position in the forward order
fn rank(status: OrderStatus) -> usize {
    OrderStatus::ALL
        .iter()
        .position(|s| *s == status)
        .unwrap_or(usize::MAX)
}

pub fn setter(status: OrderStatus) -> Option<Setter> {
    match stage(status)? {
        0 => Some(Setter::Creation),
        1 | 2 => Some(Setter::Restaurant),
        _ => Some(Setter::Rider),
    }
}

/// Whether a rider may see and accept an order in this status
pub fn is_dispatchable(status: OrderStatus) -> bool {
    matches!(stage(status), Some(s) if s < RIDER_STAGE)
}

fn invalid(from: OrderStatus, to: OrderStatus, reason: &str) -> OrderError {
    OrderError::InvalidTransition {
        from,
        to,
        reason: reason.to_string(),
    }
}

/// Validate a forward status change (never `Cancelled`)
pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    has_rider: bool,
) -> Result<Transition, OrderError> {
    if from == to {
        return Ok(Transition::NoOp);
    }
    if from.is_terminal() {
        return Err(invalid(from, to, "order is already closed"));
    }
    let (Some(from_stage), Some(to_stage)) = (stage(from), stage(to)) else {
        return Err(invalid(from, to, "cancellation is not a status step"));
    };
    if rank(to) < rank(from) {
        return Err(invalid(from, to, "status cannot move backwards"));
    }
    // Arrived may skip the Ready stage
    let max_stage = if to == OrderStatus::Arrived && from_stage >= 1 {
        RIDER_STAGE
    } else {
        from_stage + 1
    };
    if to_stage > max_stage {
        return Err(invalid(from, to, "status can advance one stage at a time"));
    }
    if to_stage >= RIDER_STAGE && !has_rider {
        return Err(invalid(from, to, "no rider assigned"));
    }
    Ok(Transition::Apply)
}

/// Role check for setting `to` on this order
pub fn authorize_status(
    actor: &Actor,
    snapshot: &OrderSnapshot,
    to: OrderStatus,
) -> Result<(), OrderError> {
    if actor.is_admin() {
        return Ok(());
    }
    let allowed = match setter(to) {
        Some(Setter::Restaurant) => {
            actor.role == ActorRole::Restaurant
                && actor.restaurant_id.as_deref() == Some(snapshot.restaurant_id.as_str())
        }
        Some(Setter::Rider) => {
            actor.role == ActorRole::Rider
                && actor
                    .rider_id
                    .as_deref()
                    .is_some_and(|id| snapshot.involves_rider(id))
        }
        Some(Setter::Creation) | None => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(OrderError::PermissionDenied(format!(
            "{} may not set status {}",
            actor.role, to
        )))
    }
}

/// Role and state check for cancelling this order
///
/// - admin: any non-terminal state
/// - owning restaurant: before the rider arrives
/// - ordering customer: while Pending
/// - riders never cancel
///
/// Cancelling an already cancelled order is a no-op.
pub fn authorize_cancel(actor: &Actor, snapshot: &OrderSnapshot) -> Result<Transition, OrderError> {
    let current = stage(snapshot.status);
    let (allowed, limit) = match actor.role {
        ActorRole::Admin => (true, Some(6)),
        ActorRole::Restaurant => (
            actor.restaurant_id.as_deref() == Some(snapshot.restaurant_id.as_str()),
            Some(2),
        ),
        ActorRole::Customer => (actor.user_id == snapshot.customer_id, Some(0)),
        ActorRole::Rider => (false, None),
    };
    if !allowed {
        return Err(OrderError::PermissionDenied(format!(
            "{} may not cancel this order",
            actor.role
        )));
    }
    if snapshot.status == OrderStatus::Cancelled {
        return Ok(Transition::NoOp);
    }
    if snapshot.is_terminal() {
        return Err(OrderError::InvalidOperation(
            CommandErrorCode::OrderTerminal,
            format!("order is already {}", snapshot.status),
        ));
    }
    match (current, limit) {
        (Some(current), Some(limit)) if current <= limit => Ok(Transition::Apply),
        _ => Err(invalid(
            snapshot.status,
            OrderStatus::Cancelled,
            "too late to cancel",
        )),
    }
}
