//! 访问控制规则
//!
//! ## 规则
//! - admin 可以访问全部资源
//! - 订单只对参与方可见：下单顾客、所属餐厅、已分配骑手
//! - 未分配且可派送的订单对所有骑手可见 (抢单列表)
//! - 频道订阅与上述可见性一致

use shared::message::Channel;
use shared::order::{Actor, ActorRole, OrderSnapshot};

use crate::orders::dispatch;
use crate::utils::{AppError, AppResult};

/// 要求管理员
pub fn ensure_admin(actor: &Actor) -> AppResult<()> {
    if actor.role == ActorRole::Admin {
        Ok(())
    } else {
        Err(AppError::admin_required())
    }
}

/// 骑手本人或管理员才能操作骑手档案
pub fn ensure_rider_self(actor: &Actor, rider_id: &str) -> AppResult<()> {
    match actor.role {
        ActorRole::Admin => Ok(()),
        ActorRole::Rider if actor.rider_id.as_deref() == Some(rider_id) => Ok(()),
        _ => Err(AppError::permission_denied(format!(
            "Not allowed to act for rider {}",
            rider_id
        ))),
    }
}

pub fn can_view_order(actor: &Actor, order: &OrderSnapshot) -> bool {
    match actor.role {
        ActorRole::Admin => true,
        ActorRole::Customer => order.customer_id == actor.user_id,
        ActorRole::Restaurant => actor.restaurant_id.as_deref() == Some(order.restaurant_id.as_str()),
        ActorRole::Rider => match actor.rider_id.as_deref() {
            Some(rider_id) => order.involves_rider(rider_id) || dispatch::is_available(order),
            None => false,
        },
    }
}

/// 是否允许订阅频道
///
/// `lookup` 用于按订单 ID 读取订单 (仅 `order-*` 频道需要)。
pub fn can_subscribe<F>(actor: &Actor, channel: &str, lookup: F) -> bool
where
    F: FnOnce(&str) -> Option<OrderSnapshot>,
{
    let Some(parsed) = Channel::parse(channel) else {
        return false;
    };
    if actor.role == ActorRole::Admin {
        return true;
    }
    match parsed {
        Channel::Riders => actor.role == ActorRole::Rider,
        Channel::Rider(id) => actor.rider_id.as_deref() == Some(id),
        Channel::User(id) => actor.user_id == id,
        Channel::Restaurant(id) => actor.restaurant_id.as_deref() == Some(id),
        Channel::Order(id) => lookup(id).is_some_and(|order| can_view_order(actor, &order)),
    }
}
